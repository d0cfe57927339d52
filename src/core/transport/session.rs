//! Session registry for the multiplexed HTTP transport.
//!
//! Each `GET /sse` connection gets one [`ProtocolSession`] (protocol state)
//! and one outbound channel (the transport half), registered under a fresh
//! UUID before the connect handshake is emitted. `POST /messages` looks the
//! pair up by `sessionId`; the entry is removed atomically when the event
//! stream closes, so a posted message can never be misrouted to a dead
//! session.

use std::collections::HashMap;
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::task::{Context, Poll};

use axum::response::sse::Event;
use futures::Stream;
use tokio::sync::{Mutex, mpsc};
use tracing::{info, warn};
use uuid::Uuid;

use super::rpc::ProtocolSession;
use crate::core::McpServer;

/// Outbound responses queued per session before the stream picks them up.
const SESSION_CHANNEL_CAPACITY: usize = 32;

/// A registered session: the protocol half and the transport half.
#[derive(Clone)]
pub struct SessionHandle {
    /// Protocol server instance for this session. The mutex serializes the
    /// session's dispatches; a dispatch is never interleaved with another on
    /// the same session.
    pub session: Arc<Mutex<ProtocolSession>>,

    /// Sender feeding the session's SSE stream.
    pub tx: mpsc::Sender<String>,
}

/// Registry of live SSE sessions.
///
/// Mutated only at connect and disconnect; between those points it is
/// read-only, so lookups from concurrent request handlers are cheap.
#[derive(Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new session for the given server.
    ///
    /// Registers the `(id -> protocol server, id -> sender)` pair before
    /// returning, so the session is routable before its handshake event is
    /// ever written. Takes the manager by `Arc` because the returned stream
    /// keeps a handle for its own deregistration.
    pub fn open(manager: &Arc<SessionManager>, server: McpServer) -> (String, SseSession) {
        let id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(SESSION_CHANNEL_CAPACITY);

        let handle = SessionHandle {
            session: Arc::new(Mutex::new(ProtocolSession::new(server))),
            tx,
        };
        manager.sessions_mut().insert(id.clone(), handle);

        let stream = SseSession {
            id: id.clone(),
            rx,
            manager: Arc::clone(manager),
            endpoint_sent: false,
        };
        (id, stream)
    }

    /// Look up a session by identifier.
    pub fn lookup(&self, id: &str) -> Option<SessionHandle> {
        self.sessions().get(id).cloned()
    }

    /// Remove a session from the registry.
    ///
    /// Unregistration happens first; whatever resources the entry still holds
    /// are released when the removed handle is dropped, after the map is
    /// already consistent.
    pub fn close(&self, id: &str) {
        let removed = self.sessions_mut().remove(id);
        if removed.is_some() {
            info!("Session {} closed ({} active)", id, self.len());
        }
    }

    /// Number of currently registered sessions.
    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }

    fn sessions(&self) -> RwLockReadGuard<'_, HashMap<String, SessionHandle>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn sessions_mut(&self) -> RwLockWriteGuard<'_, HashMap<String, SessionHandle>> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// The server→client half of one SSE session.
///
/// Emits the `endpoint` handshake event first, then forwards queued JSON-RPC
/// responses as `message` events. Dropping the stream (client disconnect,
/// write error, or server shutdown) unregisters the session.
pub struct SseSession {
    id: String,
    rx: mpsc::Receiver<String>,
    manager: Arc<SessionManager>,
    endpoint_sent: bool,
}

impl SseSession {
    /// The session identifier carried in the `endpoint` event.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Stream for SseSession {
    type Item = Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if !self.endpoint_sent {
            self.endpoint_sent = true;
            let endpoint = format!("/messages?sessionId={}", self.id);
            return Poll::Ready(Some(Ok(Event::default().event("endpoint").data(endpoint))));
        }

        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(payload)) => {
                Poll::Ready(Some(Ok(Event::default().event("message").data(payload))))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for SseSession {
    fn drop(&mut self) {
        self.manager.close(&self.id);
    }
}

/// Deliver a response payload to a session's stream.
///
/// Writes after the stream has closed are expected during disconnect races;
/// they are logged and discarded rather than treated as failures.
pub async fn deliver(handle: &SessionHandle, session_id: &str, payload: String) {
    if handle.tx.send(payload).await.is_err() {
        warn!(
            "Session {} closed before the response could be delivered; dropping it",
            session_id
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use futures::StreamExt;

    fn test_server() -> McpServer {
        McpServer::new(Config::default()).unwrap()
    }

    #[tokio::test]
    async fn test_sessions_get_distinct_ids() {
        let manager = Arc::new(SessionManager::new());
        let (id_a, _stream_a) = SessionManager::open(&manager, test_server());
        let (id_b, _stream_b) = SessionManager::open(&manager, test_server());
        assert_ne!(id_a, id_b);
        assert_eq!(manager.len(), 2);
    }

    #[tokio::test]
    async fn test_session_registered_before_handshake() {
        let manager = Arc::new(SessionManager::new());
        let (id, stream) = SessionManager::open(&manager, test_server());
        // Routable before the stream has been polled at all.
        assert!(manager.lookup(&id).is_some());
        drop(stream);
    }

    #[tokio::test]
    async fn test_first_event_is_endpoint_with_session_id() {
        let manager = Arc::new(SessionManager::new());
        let (id, mut stream) = SessionManager::open(&manager, test_server());
        let event = stream.next().await.unwrap().unwrap();
        let rendered = format!("{:?}", event);
        assert!(rendered.contains("endpoint"));
        assert!(rendered.contains(&id));
    }

    #[tokio::test]
    async fn test_drop_unregisters_session() {
        let manager = Arc::new(SessionManager::new());
        let (id, stream) = SessionManager::open(&manager, test_server());
        assert!(manager.lookup(&id).is_some());
        drop(stream);
        assert!(manager.lookup(&id).is_none());
        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn test_closing_one_session_leaves_the_other() {
        let manager = Arc::new(SessionManager::new());
        let (id_a, stream_a) = SessionManager::open(&manager, test_server());
        let (id_b, _stream_b) = SessionManager::open(&manager, test_server());
        drop(stream_a);
        assert!(manager.lookup(&id_a).is_none());
        assert!(manager.lookup(&id_b).is_some());
    }

    #[tokio::test]
    async fn test_message_flows_to_stream() {
        let manager = Arc::new(SessionManager::new());
        let (id, mut stream) = SessionManager::open(&manager, test_server());
        let handle = manager.lookup(&id).unwrap();

        deliver(&handle, &id, "{\"jsonrpc\":\"2.0\"}".to_string()).await;

        // Skip the endpoint handshake, then read the queued message.
        let _endpoint = stream.next().await.unwrap().unwrap();
        let message = stream.next().await.unwrap().unwrap();
        assert!(format!("{:?}", message).contains("jsonrpc"));
    }

    #[tokio::test]
    async fn test_messages_are_isolated_per_session() {
        let manager = Arc::new(SessionManager::new());
        let (id_a, mut stream_a) = SessionManager::open(&manager, test_server());
        let (id_b, mut stream_b) = SessionManager::open(&manager, test_server());

        let handle_a = manager.lookup(&id_a).unwrap();
        deliver(&handle_a, &id_a, "only-for-a".to_string()).await;

        let _endpoint_a = stream_a.next().await.unwrap().unwrap();
        let message = stream_a.next().await.unwrap().unwrap();
        assert!(format!("{:?}", message).contains("only-for-a"));

        // Session B got its endpoint handshake and nothing else.
        let _endpoint_b = stream_b.next().await.unwrap().unwrap();
        let nothing =
            tokio::time::timeout(std::time::Duration::from_millis(50), stream_b.next()).await;
        assert!(nothing.is_err(), "session {} must not see session {}'s traffic", id_b, id_a);
    }

    #[tokio::test]
    async fn test_deliver_after_close_is_guarded() {
        let manager = Arc::new(SessionManager::new());
        let (id, stream) = SessionManager::open(&manager, test_server());
        let handle = manager.lookup(&id).unwrap();
        drop(stream);
        // Must not panic; the message is discarded.
        deliver(&handle, &id, "late".to_string()).await;
    }
}
