use anyhow::{Context, Result};
use sender_core::wire;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;

/// A datagram endpoint bound to an ephemeral local address and connected
/// to a single remote address.
///
/// Outbound send is fire-and-forget. Failures other than "would block" are
/// logged and surfaced to the caller; the transport performs no
/// retransmission of its own — that is a sender-level decision (Stage 3).
#[derive(Clone)]
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
}

impl UdpTransport {
    /// Bind an ephemeral local socket and connect it to `remote`.
    pub async fn connect(remote: SocketAddr) -> Result<Self> {
        let local: SocketAddr = if remote.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        }
        .parse()
        .expect("valid ephemeral bind address");

        let socket = Socket::new(
            Domain::for_address(local),
            Type::DGRAM,
            Some(Protocol::UDP),
        )
        .context("creating UDP socket")?;
        socket.set_reuse_address(true).ok();
        socket.set_nonblocking(true).context("setting nonblocking")?;
        socket.bind(&local.into()).context("binding local address")?;

        let std_socket: std::net::UdpSocket = socket.into();
        let tokio_socket = UdpSocket::from_std(std_socket).context("wrapping std socket")?;
        tokio_socket.connect(remote).await.context("connecting to remote")?;

        tracing::info!(
            local = %tokio_socket.local_addr()?,
            remote = %remote,
            "UDP transport connected"
        );

        Ok(Self {
            socket: Arc::new(tokio_socket),
        })
    }

    /// Send the given sequence number as the 4-byte wire payload.
    ///
    /// A send failure is logged and returned as an error, but it's the
    /// caller's responsibility to decide whether that is fatal — a single
    /// failed send is not.
    pub async fn send_seq(&self, seq: u32) -> Result<()> {
        match self.socket.send(&wire::encode_seq(seq)).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(()),
            Err(e) => {
                tracing::warn!(seq, error = %e, "send failed");
                Err(e).context("sending datagram")
            }
        }
    }

    /// Receive one datagram and decode it as a cumulative ack, if valid.
    pub async fn recv_ack(&self) -> Result<Option<u32>> {
        let mut buf = [0u8; 64];
        let n = self.socket.recv(&mut buf).await.context("receiving datagram")?;
        Ok(wire::decode_ack(&buf[..n]))
    }
}
