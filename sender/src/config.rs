use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Adaptive UDP sender: reliably delivers a target sequence number over an
/// unreliable, capacity-limited, delay-inducing datagram channel.
#[derive(Parser, Debug, Clone)]
#[command(name = "adaptive-udp-sender", about, long_about = None)]
pub struct Args {
    /// `host:port` of the peer datagram endpoint.
    #[arg(short, long)]
    pub remote: String,

    /// Path to receive DEBUG-level log records. Defaults to stderr.
    #[arg(short, long)]
    pub log_path: Option<PathBuf>,

    /// Target sequence number; success when the cumulative ack reaches it.
    #[arg(short, long, default_value_t = 1000)]
    pub target: u32,
}

/// Tunable constants the estimator stages are built around, exposed as a
/// `Config` so tests can exercise the estimator against a faster simulated
/// peer without touching the estimator's logic.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of identical copies sent in the Stage 1 burst.
    pub stage1_burst_count: usize,
    /// Timeout waiting for the first / second ack in Stage 1.
    pub stage1_timeout: Duration,
    /// Gap, in multiples of `service_delay`, that signals buffer overflow
    /// in Stage 2 (`BURST_DROP`).
    pub burst_drop: u32,
    /// Target sequence number to reach in Stage 3.
    pub target: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stage1_burst_count: 8,
            stage1_timeout: Duration::from_secs(10),
            burst_drop: 8,
            target: 1000,
        }
    }
}

impl Config {
    pub fn from_args(args: &Args) -> Self {
        Self {
            target: args.target,
            ..Default::default()
        }
    }
}
