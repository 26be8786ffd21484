use anyhow::Context;
use clap::Parser;
use sender::config::{Args, Config};
use sender::logging;
use sender::supervisor::{Outcome, Supervisor};
use std::net::ToSocketAddrs;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    let _log_guard = logging::init_logging(args.log_path.as_deref());

    match run(args).await {
        Ok(ExitCode::SUCCESS) => ExitCode::SUCCESS,
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "fatal I/O error");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let remote = args
        .remote
        .to_socket_addrs()
        .context("resolving remote address")?
        .next()
        .context("remote address resolved to no candidates")?;

    let config = Config::from_args(&args);
    let supervisor = Supervisor::bind(remote, config).await?;

    match supervisor.run().await? {
        Outcome::Success { elapsed } => {
            tracing::info!(?elapsed, target = args.target, "target sequence delivered");
            println!("delivered target {} in {:?}", args.target, elapsed);
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Infeasible(e) => {
            tracing::error!(error = %e, "channel infeasible");
            eprintln!("channel infeasible: {e}");
            Ok(ExitCode::from(1))
        }
    }
}
