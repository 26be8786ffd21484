use anyhow::Context;
use clap::Parser;
use messenger::config::Args;
use messenger::logging;
use messenger::server::Server;
use std::net::ToSocketAddrs;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    let _log_guard = logging::init_logging(args.log_path.as_deref());

    if let Err(e) = run(args).await {
        tracing::error!(error = %e, "fatal I/O error");
        eprintln!("error: {e:#}");
        return ExitCode::from(2);
    }
    ExitCode::SUCCESS
}

async fn run(args: Args) -> anyhow::Result<()> {
    let addr = format!("{}:{}", args.bind, args.port)
        .to_socket_addrs()
        .context("resolving bind address")?
        .next()
        .context("bind address resolved to no candidates")?;

    let server = Server::bind(addr).await?;
    server.run().await
}
