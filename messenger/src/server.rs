//! The dispatcher loop: one task per connection, a shared session table and
//! mailbox map protected by `tokio::sync::Mutex` rather than `RwLock`,
//! since every operation here (associate, get, push) mutates at least one
//! table.

use crate::framing::{read_frame, write_frame, FramingError};
use crate::mailbox::Mailbox;
use crate::protocol::{parse_request, Request, Response};
use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

type Sessions = Arc<Mutex<HashSet<u8>>>;
type Mailboxes = Arc<Mutex<HashMap<u8, Mailbox>>>;

pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    sessions: Sessions,
    mailboxes: Mailboxes,
}

impl Server {
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding relay listener to {addr}"))?;
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, "messenger relay listening");
        Ok(Self {
            listener,
            local_addr,
            sessions: Arc::new(Mutex::new(HashSet::new())),
            mailboxes: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts connections forever, dispatching each to its own task.
    /// Returns only if the listener itself fails.
    pub async fn run(self) -> Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            tracing::debug!(%peer, "connection accepted");
            let sessions = self.sessions.clone();
            let mailboxes = self.mailboxes.clone();
            tokio::spawn(async move {
                handle_connection(stream, sessions, mailboxes).await;
            });
        }
    }
}

async fn handle_connection(mut stream: TcpStream, sessions: Sessions, mailboxes: Mailboxes) {
    let mut associated_id: Option<u8> = None;

    loop {
        let frame = match read_frame(&mut stream).await {
            Ok(f) => f,
            Err(FramingError::Closed) => break,
            Err(e) => {
                tracing::warn!(error = %e, "framing error, closing connection");
                break;
            }
        };

        let request = parse_request(&frame);
        let response = dispatch(request, &sessions, &mailboxes, &mut associated_id).await;

        if let Err(e) = write_frame(&mut stream, &response.encode()).await {
            tracing::warn!(error = %e, "failed writing response, closing connection");
            break;
        }
    }

    if let Some(id) = associated_id {
        sessions.lock().await.remove(&id);
        tracing::debug!(id, "stream closed, session freed");
    }
}

async fn dispatch(
    request: Request,
    sessions: &Sessions,
    mailboxes: &Mailboxes,
    associated_id: &mut Option<u8>,
) -> Response {
    match request {
        Request::Associate { id } => {
            let mut sessions = sessions.lock().await;
            if sessions.contains(&id) {
                Response::UnknownError(id)
            } else {
                sessions.insert(id);
                *associated_id = Some(id);
                Response::AssociationSuccess(id)
            }
        }
        Request::Get { id } => {
            let is_associated = sessions.lock().await.contains(&id);
            if !is_associated {
                return Response::AssociationFailed(id);
            }
            let mut mailboxes = mailboxes.lock().await;
            let mailbox = mailboxes.entry(id).or_insert_with(Mailbox::new);
            match mailbox.pop() {
                Some((sender_id, payload)) => Response::GetResponse {
                    receiver_id: id,
                    sender_id,
                    payload,
                },
                None => Response::BufferEmpty(id),
            }
        }
        Request::Push {
            sender_id,
            receiver_id,
            payload,
        } => {
            let is_associated = sessions.lock().await.contains(&sender_id);
            if !is_associated {
                return Response::AssociationFailed(sender_id);
            }
            let mut mailboxes = mailboxes.lock().await;
            let mailbox = mailboxes.entry(receiver_id).or_insert_with(Mailbox::new);
            if mailbox.push(sender_id, payload) {
                Response::PositiveAck(sender_id)
            } else {
                Response::BufferFull(sender_id)
            }
        }
        Request::Malformed { id } => Response::UnknownError(id),
    }
}
