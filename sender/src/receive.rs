use crate::shared::SharedAckLog;
use crate::transport::UdpTransport;
use std::time::Instant;

/// Receive-event loop: every inbound datagram is parsed and routed to the
/// ack log. Runs until the transport reports a fatal receive error
/// (typically because the supervisor closed it).
pub async fn receive_loop(transport: UdpTransport, ack_log: SharedAckLog) {
    loop {
        match transport.recv_ack().await {
            Ok(Some(seq)) => {
                ack_log.push(Instant::now(), seq).await;
            }
            Ok(None) => {
                tracing::trace!("ignored datagram of invalid length");
            }
            Err(e) => {
                tracing::info!(error = %e, "receive loop exiting");
                break;
            }
        }
    }
}
