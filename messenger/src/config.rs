use clap::Parser;
use std::path::PathBuf;

/// Messenger relay: a dispatcher over a reliable message-framed stream,
/// maintaining per-client sessions and bounded FIFO mailboxes.
#[derive(Parser, Debug, Clone)]
#[command(name = "messenger-relay", about, long_about = None)]
pub struct Args {
    /// Address to bind the stream listener to.
    #[arg(short, long, default_value = "0.0.0.0")]
    pub bind: String,

    /// Port to bind the stream listener to.
    #[arg(short, long, default_value_t = 9100)]
    pub port: u16,

    /// Path to receive DEBUG-level log records. Defaults to stderr.
    #[arg(short, long)]
    pub log_path: Option<PathBuf>,
}
