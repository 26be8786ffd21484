use std::time::Duration;

/// Failures the estimator stages can report up to the supervisor.
///
/// Any [`EstimatorError`] is fatal and causes the process to exit with the
/// "infeasible channel" exit code.
#[derive(Debug, thiserror::Error)]
pub enum EstimatorError {
    /// Stage 1's first timeout expired with no ack at all. The stage is
    /// retried once by the caller before this is treated as fatal.
    #[error("extremely high loss: no acknowledgment observed within timeout")]
    ExtremelyHighLoss,

    /// Stage 1 observed exactly one ack before its second timeout expired.
    /// `rtt` is still reported (it's the one real measurement we have) but
    /// loss is too high to proceed to Stage 2.
    #[error("only one acknowledgment observed (rtt={rtt:?}); loss too high to continue")]
    PartialLoss { rtt: Duration },

    /// A later stage concluded the channel cannot be characterized (e.g.
    /// infinite rtt or infinite service_delay).
    #[error("channel infeasible: {0}")]
    Infeasible(&'static str),
}
