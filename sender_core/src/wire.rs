//! The sender-receiver datagram wire format: a single 4-byte big-endian
//! unsigned integer, both directions.

/// Encode a sequence number as the 4-byte big-endian outbound payload.
pub fn encode_seq(seq: u32) -> [u8; 4] {
    seq.to_be_bytes()
}

/// Decode an inbound datagram into a cumulative ack.
///
/// Any datagram not exactly 4 bytes long is not a valid ack and is ignored.
pub fn decode_ack(datagram: &[u8]) -> Option<u32> {
    let bytes: [u8; 4] = datagram.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_seq() {
        for seq in [0u32, 1, 1000, u32::MAX] {
            assert_eq!(decode_ack(&encode_seq(seq)), Some(seq));
        }
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(decode_ack(&[]), None);
        assert_eq!(decode_ack(&[1, 2, 3]), None);
        assert_eq!(decode_ack(&[1, 2, 3, 4, 5]), None);
    }
}
