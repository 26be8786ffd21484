use crate::config::Config;
use crate::estimator;
use crate::receive::receive_loop;
use crate::shared::SharedAckLog;
use crate::transmit::{transmit_loop, SendQueue};
use crate::transport::UdpTransport;
use anyhow::Result;
use sender_core::EstimatorError;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::sync::mpsc;

/// How the run ended, for the CLI to translate into an exit code.
pub enum Outcome {
    /// The cumulative ack reached the target sequence.
    Success { elapsed: std::time::Duration },
    /// A stage reported the channel cannot be characterized.
    Infeasible(EstimatorError),
}

/// Owns the transport, the ack log, the send queue, and the estimate.
/// Spawns the receive and transmit tasks, runs the three stages
/// sequentially, and releases every resource exactly once whether the run
/// succeeds or a stage fails.
pub struct Supervisor {
    transport: UdpTransport,
    ack_log: SharedAckLog,
    queue_tx: SendQueue,
    queue_rx: mpsc::UnboundedReceiver<Option<u32>>,
    config: Config,
}

impl Supervisor {
    pub async fn bind(remote: SocketAddr, config: Config) -> Result<Self> {
        let transport = UdpTransport::connect(remote).await?;
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        Ok(Self {
            transport,
            ack_log: SharedAckLog::new(),
            queue_tx,
            queue_rx,
            config,
        })
    }

    pub async fn run(self) -> Result<Outcome> {
        let start = Instant::now();
        let Supervisor {
            transport,
            ack_log,
            queue_tx,
            queue_rx,
            config,
        } = self;

        let receive_handle = tokio::spawn(receive_loop(transport.clone(), ack_log.clone()));
        let transmit_handle = tokio::spawn(transmit_loop(transport.clone(), queue_rx, ack_log.clone()));

        let stage1_result = estimator::stage1(&queue_tx, &ack_log, &config).await;
        let (rtt, service_delay) = match stage1_result {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "stage1 reported the channel is infeasible");
                let _ = queue_tx.send(None);
                drop(queue_tx);
                let _ = transmit_handle.await;
                receive_handle.abort();
                return Ok(Outcome::Infeasible(e));
            }
        };
        tracing::info!(?rtt, ?service_delay, "stage1 complete");

        let buffer_depth = estimator::stage2(&queue_tx, &ack_log, rtt, service_delay, &config).await;
        tracing::info!(buffer_depth, "stage2 complete");

        estimator::stage3(&queue_tx, &ack_log, rtt, service_delay, buffer_depth, &config).await;

        drop(queue_tx);
        let _ = transmit_handle.await;
        receive_handle.abort();

        Ok(Outcome::Success {
            elapsed: start.elapsed(),
        })
    }
}
