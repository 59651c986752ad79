//! Per-connection request/response cycles.
//!
//! Both session kinds run over any ordered frame transport: a `Sink` for
//! outbound frames and a `Stream` of inbound ones. The WebSocket upgrade in
//! the server is one such transport; tests drive the same code over channels.
//!
//! Each session is an explicit state machine, and every way out of it is a
//! [`SessionEnd`] variant.

use std::fmt::Display;
use std::sync::Arc;

use axum::extract::ws::Message as Frame;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tracing::{debug, error, info, warn};

use meteora_crypto::{CodecError, validate};
use meteora_db::{Database, StoreError};
use meteora_types::wire::{SubmitFrame, encode_page};
use meteora_types::{DEFAULT_LIMIT, Message, Page};

use crate::params::{FetchQuery, PageParams};

/// How a session finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The peer closed the stream or it failed underneath us.
    PeerClosed,
    /// An inbound frame was not a well-formed submit frame.
    Malformed,
    /// The message failed id or signature verification.
    Rejected,
    /// The content address was already stored.
    Duplicate,
    StoreFailed,
    SendFailed,
    /// A fetch session delivered its single reply.
    Replied,
}

enum SubmitState {
    AwaitMessage,
    Validate(Message),
    Persist(Message),
    Reply(Page),
    Closed(SessionEnd),
}

enum FetchState {
    ParseParams(FetchQuery),
    Query(PageParams),
    Reply(Page),
    Closed(SessionEnd),
}

/// Submit loop: read a message, check it, store it, answer with the newest
/// page, repeat. Any failure closes the session without a reply.
pub async fn run_submit_session<S, R, E>(mut sender: S, mut receiver: R, db: Arc<Database>) -> SessionEnd
where
    S: Sink<Frame> + Unpin,
    S::Error: Display,
    R: Stream<Item = Result<Frame, E>> + Unpin,
    E: Display,
{
    info!("Submit session opened");

    let mut state = SubmitState::AwaitMessage;
    let end = loop {
        state = match state {
            SubmitState::AwaitMessage => match next_submit(&mut receiver).await {
                None => SubmitState::Closed(SessionEnd::PeerClosed),
                Some(Ok(message)) => {
                    debug!("Received message {}", message.id);
                    SubmitState::Validate(message)
                }
                Some(Err(e)) => {
                    warn!("Dropping session on bad frame: {}", e);
                    SubmitState::Closed(SessionEnd::Malformed)
                }
            },

            SubmitState::Validate(message) => match validate(&message) {
                Ok(()) => SubmitState::Persist(message),
                Err(e) => {
                    warn!("Rejected message {}: {}", message.id, e);
                    SubmitState::Closed(SessionEnd::Rejected)
                }
            },

            SubmitState::Persist(message) => {
                match with_store(&db, move |db| db.submit(&message, DEFAULT_LIMIT)).await {
                    Ok(page) => SubmitState::Reply(page),
                    Err(StoreError::DuplicateId(id)) => {
                        warn!("Duplicate submission of {}", id);
                        SubmitState::Closed(SessionEnd::Duplicate)
                    }
                    Err(e) => {
                        error!("Store failed during submit: {}", e);
                        SubmitState::Closed(SessionEnd::StoreFailed)
                    }
                }
            }

            SubmitState::Reply(page) => match send_page(&mut sender, &page).await {
                Ok(()) => SubmitState::AwaitMessage,
                Err(end) => SubmitState::Closed(end),
            },

            SubmitState::Closed(end) => break end,
        };
    };

    if let Err(e) = sender.close().await {
        debug!("Close failed: {}", e);
    }
    info!("Submit session closed: {:?}", end);
    end
}

/// Single-shot fetch: one page for the given query, then close.
pub async fn run_fetch_session<S>(mut sender: S, query: FetchQuery, db: Arc<Database>) -> SessionEnd
where
    S: Sink<Frame> + Unpin,
    S::Error: Display,
{
    info!("Fetch session opened");

    let mut state = FetchState::ParseParams(query);
    let end = loop {
        state = match state {
            FetchState::ParseParams(query) => FetchState::Query(PageParams::from(&query)),

            FetchState::Query(params) => {
                debug!("Fetching limit={} offset={}", params.limit, params.offset);
                match with_store(&db, move |db| db.select_page(params.limit, params.offset)).await {
                    Ok(page) => FetchState::Reply(page),
                    Err(e) => {
                        error!("Store failed during fetch: {}", e);
                        FetchState::Closed(SessionEnd::StoreFailed)
                    }
                }
            }

            FetchState::Reply(page) => match send_page(&mut sender, &page).await {
                Ok(()) => FetchState::Closed(SessionEnd::Replied),
                Err(end) => FetchState::Closed(end),
            },

            FetchState::Closed(end) => break end,
        };
    };

    if let Err(e) = sender.close().await {
        debug!("Close failed: {}", e);
    }
    info!("Fetch session closed: {:?}", end);
    end
}

/// Wait for the next data frame and decode it. `None` means the peer is gone;
/// control frames are skipped.
async fn next_submit<R, E>(receiver: &mut R) -> Option<Result<Message, CodecError>>
where
    R: Stream<Item = Result<Frame, E>> + Unpin,
    E: Display,
{
    loop {
        let raw = match receiver.next().await? {
            Ok(Frame::Text(text)) => text.as_str().as_bytes().to_vec(),
            Ok(Frame::Binary(data)) => data.to_vec(),
            Ok(Frame::Ping(_)) | Ok(Frame::Pong(_)) => continue,
            Ok(Frame::Close(_)) => return None,
            Err(e) => {
                // Abrupt disconnects land here; they only end the session.
                debug!("Read failed, closing session: {}", e);
                return None;
            }
        };
        return Some(
            SubmitFrame::parse(&raw)
                .map(Message::from)
                .map_err(CodecError::from),
        );
    }
}

/// Run a store operation on the blocking pool. The store lock is taken and
/// released inside the closure, so dropping the session never strands it.
async fn with_store<F, T>(db: &Arc<Database>, op: F) -> Result<T, StoreError>
where
    F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let db = db.clone();
    tokio::task::spawn_blocking(move || op(&db))
        .await
        .map_err(|e| StoreError::Unavailable(format!("store task failed: {}", e)))?
}

async fn send_page<S>(sender: &mut S, page: &[Message]) -> Result<(), SessionEnd>
where
    S: Sink<Frame> + Unpin,
    S::Error: Display,
{
    let json = encode_page(page).map_err(|e| {
        error!("Failed to encode page: {}", e);
        SessionEnd::SendFailed
    })?;

    sender.send(Frame::Text(json.into())).await.map_err(|e| {
        debug!("Write failed, closing session: {}", e);
        SessionEnd::SendFailed
    })?;

    debug!("Sent page of {} messages", page.len());
    Ok(())
}
