//! Length-prefixed stream framing, one logical message per frame: a
//! 4-byte big-endian length prefix ahead of each frame's bytes, so a
//! single TCP connection carries a stream of discrete messages without
//! needing a WebSocket dependency.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame we will allocate a buffer for. Every real frame in this
/// protocol is at most 5 header bytes + 254 payload bytes; this generously
/// bounds a misbehaving or corrupt peer instead of trusting its length.
const MAX_FRAME_LEN: usize = 4096;

#[derive(thiserror::Error, Debug)]
pub enum FramingError {
    #[error("peer closed the stream")]
    Closed,
    #[error("frame length {0} exceeds the maximum of {MAX_FRAME_LEN}")]
    TooLarge(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub async fn read_frame<R: AsyncRead + Unpin>(stream: &mut R) -> Result<Vec<u8>, FramingError> {
    let mut len_buf = [0u8; 4];
    if let Err(e) = stream.read_exact(&mut len_buf).await {
        return Err(if e.kind() == std::io::ErrorKind::UnexpectedEof {
            FramingError::Closed
        } else {
            FramingError::Io(e)
        });
    }
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        return Err(FramingError::TooLarge(len));
    }
    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf).await?;
    Ok(buf)
}

pub async fn write_frame<W: AsyncWrite + Unpin>(
    stream: &mut W,
    data: &[u8],
) -> Result<(), FramingError> {
    let len = (data.len() as u32).to_be_bytes();
    stream.write_all(&len).await?;
    stream.write_all(data).await?;
    stream.flush().await?;
    Ok(())
}
