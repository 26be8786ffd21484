//! The relay's logical packet format: management, control and data
//! packets framed by `framing.rs`, encoded and parsed here.

pub const MAX_PAYLOAD_LEN: usize = 254;

/// A parsed request frame. `Malformed` covers every reject path that isn't
/// one of the three well-formed requests: unknown type/message, a PUSH
/// whose declared length doesn't match its payload, or a frame too short
/// to carry even an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Associate { id: u8 },
    Get { id: u8 },
    Push {
        sender_id: u8,
        receiver_id: u8,
        payload: Vec<u8>,
    },
    Malformed { id: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    AssociationSuccess(u8),
    AssociationFailed(u8),
    UnknownError(u8),
    BufferEmpty(u8),
    PositiveAck(u8),
    BufferFull(u8),
    GetResponse {
        receiver_id: u8,
        sender_id: u8,
        payload: Vec<u8>,
    },
}

pub fn parse_request(frame: &[u8]) -> Request {
    if frame.len() < 3 {
        // Not even an id to blame the error on; id 0 is the best we can do.
        return Request::Malformed { id: 0 };
    }
    let packet_type = frame[0];
    let message = frame[1];
    let id = frame[2];

    match (packet_type, message) {
        (0, 0) => Request::Associate { id },
        (1, 0) => Request::Get { id },
        (2, 1) => {
            if frame.len() < 5 {
                return Request::Malformed { id };
            }
            let receiver_id = frame[3];
            let length = frame[4] as usize;
            let payload = &frame[5..];
            if length >= 255 || length != payload.len() {
                Request::Malformed { id }
            } else {
                Request::Push {
                    sender_id: id,
                    receiver_id,
                    payload: payload.to_vec(),
                }
            }
        }
        _ => Request::Malformed { id },
    }
}

impl Response {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Response::AssociationSuccess(id) => vec![0, 1, *id],
            Response::AssociationFailed(id) => vec![0, 2, *id],
            Response::UnknownError(id) => vec![0, 3, *id],
            Response::BufferEmpty(id) => vec![1, 1, *id],
            Response::PositiveAck(id) => vec![1, 2, *id],
            Response::BufferFull(id) => vec![1, 3, *id],
            Response::GetResponse {
                receiver_id,
                sender_id,
                payload,
            } => {
                let mut buf = Vec::with_capacity(5 + payload.len());
                buf.extend_from_slice(&[2, 0, *receiver_id, *sender_id, payload.len() as u8]);
                buf.extend_from_slice(payload);
                buf
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_associate() {
        assert_eq!(parse_request(&[0, 0, 7]), Request::Associate { id: 7 });
    }

    #[test]
    fn parses_get() {
        assert_eq!(parse_request(&[1, 0, 9]), Request::Get { id: 9 });
    }

    #[test]
    fn parses_push_with_matching_length() {
        let mut frame = vec![2, 1, 7, 9, 2];
        frame.extend_from_slice(b"hi");
        assert_eq!(
            parse_request(&frame),
            Request::Push {
                sender_id: 7,
                receiver_id: 9,
                payload: b"hi".to_vec()
            }
        );
    }

    #[test]
    fn rejects_push_with_mismatched_length() {
        let mut frame = vec![2, 1, 7, 9, 3];
        frame.extend_from_slice(b"hi");
        assert_eq!(parse_request(&frame), Request::Malformed { id: 7 });
    }

    #[test]
    fn rejects_push_at_length_255() {
        let payload = vec![0u8; 255];
        let mut frame = vec![2, 1, 7, 9, 255];
        frame.extend_from_slice(&payload);
        assert_eq!(parse_request(&frame), Request::Malformed { id: 7 });
    }

    #[test]
    fn accepts_push_at_length_254() {
        let payload = vec![0u8; 254];
        let mut frame = vec![2, 1, 7, 9, 254];
        frame.extend_from_slice(&payload);
        assert_eq!(
            parse_request(&frame),
            Request::Push {
                sender_id: 7,
                receiver_id: 9,
                payload
            }
        );
    }

    #[test]
    fn rejects_unknown_type() {
        assert_eq!(parse_request(&[5, 0, 3]), Request::Malformed { id: 3 });
    }

    #[test]
    fn encodes_get_response_header_and_payload() {
        let r = Response::GetResponse {
            receiver_id: 9,
            sender_id: 7,
            payload: b"hi".to_vec(),
        };
        assert_eq!(r.encode(), vec![2, 0, 9, 7, 2, b'h', b'i']);
    }
}
