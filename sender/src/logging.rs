use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

/// Initialize structured logging at DEBUG level.
///
/// When `log_path` is given, records are written there through a
/// non-blocking file appender, selected by the CLI's `--log-path` option.
/// With no path, records go to stderr. The returned guard must be kept
/// alive for the duration of the process — dropping it flushes and
/// detaches the writer.
pub fn init_logging(log_path: Option<&Path>) -> WorkerGuard {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));

    match log_path {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let file_name = path
                .file_name()
                .map(|n| n.to_owned())
                .unwrap_or_else(|| "sender.log".into());
            let appender = tracing_appender::rolling::never(
                dir.unwrap_or_else(|| Path::new(".")),
                file_name,
            );
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(non_blocking)
                .init();
            guard
        }
        None => {
            let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(non_blocking)
                .init();
            guard
        }
    }
}
