use crate::shared::SharedAckLog;
use crate::transport::UdpTransport;
use tokio::sync::mpsc;

/// A cooperative queue of pending sequence numbers. `None` is the
/// termination sentinel.
pub type SendQueue = mpsc::UnboundedSender<Option<u32>>;

/// The transmit loop: dequeues sequence numbers and forwards them to the
/// transport, clamping each one upward to `last_ack + 1` so an
/// already-acked sequence number is never re-sent. The queue is unbounded
/// — producers (the estimator stages) are responsible for pacing
/// themselves via sleeps between enqueues.
pub async fn transmit_loop(
    transport: UdpTransport,
    mut queue: mpsc::UnboundedReceiver<Option<u32>>,
    ack_log: SharedAckLog,
) {
    while let Some(item) = queue.recv().await {
        let Some(requested) = item else {
            tracing::debug!("transmit loop received termination sentinel");
            break;
        };
        let last_ack = ack_log.last_seq().await;
        let floor = (last_ack + 1).max(0) as u32;
        let seq = requested.max(floor);
        if let Err(e) = transport.send_seq(seq).await {
            tracing::warn!(seq, error = %e, "transient send failure, continuing");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn drains_until_sentinel() {
        // Exercises only the queue/clamp wiring; network failures in the
        // unconnected transport below are expected and swallowed rather
        // than propagated.
        let transport = UdpTransport::connect("127.0.0.1:1".parse().unwrap())
            .await
            .unwrap();
        let ack_log = SharedAckLog::new();
        let (tx, rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(transmit_loop(transport, rx, ack_log));

        tx.send(Some(0)).unwrap();
        tx.send(Some(1)).unwrap();
        tx.send(None).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("transmit loop should exit promptly after the sentinel")
            .unwrap();
    }
}
