//! IB TWS API client session.
//!
//! `IBClient` owns one connection at a time. `connect` dials, runs the
//! handshake, starts the writer and reader tasks and sends START_API.
//! Requests (see [`crate::requests`]) are encoded on the caller's task and
//! handed to the writer through a bounded queue; everything the server sends
//! comes back through the [`Wrapper`] passed to [`IBClient::new`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! let client = IBClient::new(Arc::new(LoggingWrapper));
//! client.connect("127.0.0.1", 4002, 0, Some(Duration::from_secs(10)), None).await?;
//! client.req_current_time().await;
//! client.closed().await;
//! ```

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use bytes::BytesMut;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::connection::{Connection, ConnectionStats, StatsSnapshot};
use crate::encoder::MessageEncoder;
use crate::errors::{IBApiError, Result};
use crate::protocol::client_errors::{ClientError, ALREADY_CONNECTED, NOT_CONNECTED, UPDATE_TWS};
use crate::protocol::{outgoing, NO_VALID_ID, OUTBOUND_QUEUE_CAPACITY};
use crate::reader::MessageReader;
use crate::transport::{handshake, start_api_frame, Handshake};
use crate::wrapper::Wrapper;
use crate::writer::MessageWriter;

// ============================================================================
// State
// ============================================================================

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Disconnected,
    Connecting,
    Connected,
    /// The last handshake was answered with a redirect.
    Redirect,
}

/// One live connection.
struct Session {
    server_version: i32,
    connection_time: String,
    client_id: i32,
    outbound: mpsc::Sender<BytesMut>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

struct Inner {
    state: ConnState,
    session: Option<Session>,
    optional_capabilities: Option<String>,
    /// Bumped by every connect and disconnect. A connect only installs its
    /// session if the epoch is still the one it started with.
    epoch: u64,
    /// Token of the connect attempt in flight, cancelled by `disconnect`.
    pending: Option<CancellationToken>,
}

/// What a request needs to enqueue one frame.
pub(crate) struct Outbound {
    pub server_version: i32,
    tx: mpsc::Sender<BytesMut>,
}

// ============================================================================
// IBClient
// ============================================================================

/// Async IB TWS API client.
///
/// All methods take `&self`, so one client can be shared behind an `Arc`
/// between the task that drives the session and the tasks issuing requests.
pub struct IBClient {
    wrapper: Arc<dyn Wrapper>,
    stats: Arc<ConnectionStats>,
    shutdown: CancellationToken,
    inner: Mutex<Inner>,
}

impl IBClient {
    pub fn new(wrapper: Arc<dyn Wrapper>) -> Self {
        Self {
            wrapper,
            stats: Arc::new(ConnectionStats::new()),
            shutdown: CancellationToken::new(),
            inner: Mutex::new(Inner {
                state: ConnState::Disconnected,
                session: None,
                optional_capabilities: None,
                epoch: 0,
                pending: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn wrapper(&self) -> &Arc<dyn Wrapper> {
        &self.wrapper
    }

    /// Byte and message counters for the current and past connections.
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    pub fn stats_snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Parent of every session's cancellation token. Cancelling it ends the
    /// current session and refuses new ones.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn conn_state(&self) -> ConnState {
        let inner = self.lock();
        match (&inner.state, &inner.session) {
            (ConnState::Connected, Some(session)) if session.cancel.is_cancelled() => ConnState::Disconnected,
            (state, _) => *state,
        }
    }

    /// Connected and the reader has not observed a failure.
    pub fn is_connected(&self) -> bool {
        self.conn_state() == ConnState::Connected
    }

    /// Negotiated server version of the live session.
    pub fn server_version(&self) -> Option<i32> {
        self.lock().session.as_ref().map(|s| s.server_version)
    }

    /// Connection time reported by the server in the handshake.
    pub fn connection_time(&self) -> Option<String> {
        self.lock().session.as_ref().map(|s| s.connection_time.clone())
    }

    pub fn client_id(&self) -> Option<i32> {
        self.lock().session.as_ref().map(|s| s.client_id)
    }

    /// Capabilities sent with START_API on the next connect.
    pub fn set_optional_capabilities(&self, capabilities: &str) {
        self.lock().optional_capabilities = Some(capabilities.to_string());
    }

    // ========================================================================
    // Connection Management
    // ========================================================================

    /// Dial, handshake and start the session.
    ///
    /// Failures are reported through [`Wrapper::error`] and also returned.
    /// `connect_ack` fires once the session is live; no other callback for
    /// this session can arrive before it.
    pub async fn connect(
        &self,
        host: &str,
        port: u16,
        client_id: i32,
        timeout: Option<Duration>,
        connect_options: Option<&str>,
    ) -> Result<()> {
        if self.shutdown.is_cancelled() {
            let e = IBApiError::ConnectFailed("client is shut down".into());
            self.report_error(NO_VALID_ID, e.client_error(), &e.to_string());
            return Err(e);
        }

        let (epoch, cancel, stale, capabilities) = {
            let mut inner = self.lock();
            let live = inner.session.as_ref().is_some_and(|s| !s.cancel.is_cancelled());
            if inner.state == ConnState::Connecting || (inner.state == ConnState::Connected && live) {
                drop(inner);
                self.report_error(NO_VALID_ID, ALREADY_CONNECTED, "");
                return Err(IBApiError::AlreadyConnected);
            }
            let cancel = self.shutdown.child_token();
            inner.state = ConnState::Connecting;
            inner.epoch += 1;
            inner.pending = Some(cancel.clone());
            (inner.epoch, cancel, inner.session.take(), inner.optional_capabilities.clone())
        };
        if let Some(stale) = stale {
            // A session that ended on its own still has tasks to reap.
            stale.cancel.cancel();
            join_all(stale.tasks).await;
        }

        tracing::info!(host, port, client_id, "connecting");
        let opened = tokio::select! {
            _ = cancel.cancelled() => Err(IBApiError::ConnectFailed("connect cancelled".into())),
            opened = self.open(host, port, timeout, connect_options) => opened,
        };
        let (conn, hs) = match opened {
            Ok(opened) => opened,
            Err(e) => {
                let state = if matches!(e, IBApiError::Redirect(_)) {
                    ConnState::Redirect
                } else {
                    ConnState::Disconnected
                };
                tracing::error!(error = %e, host, port, "connect failed");
                return self.fail_connect(epoch, state, e);
            }
        };

        let Handshake {
            server_version,
            connection_time,
        } = hs;
        let start_api = match start_api_frame(server_version, client_id, capabilities.as_deref()) {
            Ok(frame) => frame,
            Err(e) => return self.fail_connect(epoch, ConnState::Disconnected, e),
        };

        if cancel.is_cancelled() {
            let e = IBApiError::ConnectFailed("connect cancelled".into());
            return self.fail_connect(epoch, ConnState::Disconnected, e);
        }

        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        let Connection { reader, writer } = conn;
        let writer = MessageWriter::new(writer, rx, Arc::clone(&self.wrapper), cancel.clone()).spawn();
        // The queue is empty, so this cannot wait.
        if tx.send(start_api).await.is_err() {
            cancel.cancel();
            join_all(vec![writer]).await;
            let e = IBApiError::Disconnected("writer stopped before START_API".into());
            return self.fail_connect(epoch, ConnState::Disconnected, e);
        }

        // A disconnect during the handshake wins over this attempt.
        let rejected = {
            let mut inner = self.lock();
            if inner.epoch == epoch && !cancel.is_cancelled() {
                inner.state = ConnState::Connected;
                inner.pending = None;
                inner.session = Some(Session {
                    server_version,
                    connection_time,
                    client_id,
                    outbound: tx.clone(),
                    cancel: cancel.clone(),
                    tasks: vec![writer],
                });
                None
            } else {
                Some(writer)
            }
        };
        if let Some(writer) = rejected {
            cancel.cancel();
            join_all(vec![writer]).await;
            let e = IBApiError::ConnectFailed("connect cancelled".into());
            return self.fail_connect(epoch, ConnState::Disconnected, e);
        }
        tracing::info!(server_version, client_id, "session started");
        self.wrapper.connect_ack();

        // The reader starts last so every inbound callback follows connect_ack.
        let mut inner = self.lock();
        match inner.session.as_mut() {
            Some(session) if session.outbound.same_channel(&tx) && !cancel.is_cancelled() => {
                let reader =
                    MessageReader::new(reader, server_version, Arc::clone(&self.wrapper), cancel).spawn();
                session.tasks.push(reader);
            }
            _ => tracing::debug!("session ended during connect_ack"),
        }
        Ok(())
    }

    async fn open(
        &self,
        host: &str,
        port: u16,
        timeout: Option<Duration>,
        connect_options: Option<&str>,
    ) -> Result<(Connection, Handshake)> {
        let mut conn = Connection::dial(host, port, timeout, Arc::clone(&self.stats)).await?;
        // The dial timeout also bounds the wait for the handshake reply.
        let hs = match timeout {
            Some(limit) => tokio::time::timeout(limit, handshake(&mut conn, connect_options))
                .await
                .map_err(|_| IBApiError::Timeout(format!("no handshake reply within {limit:?}")))??,
            None => handshake(&mut conn, connect_options).await?,
        };
        Ok((conn, hs))
    }

    /// Leave the connecting state, unless a newer connect or a disconnect
    /// has taken over, and report `e`.
    fn fail_connect(&self, epoch: u64, state: ConnState, e: IBApiError) -> Result<()> {
        {
            let mut inner = self.lock();
            if inner.epoch == epoch {
                inner.state = state;
                inner.pending = None;
            }
        }
        self.report_error(NO_VALID_ID, e.client_error(), &e.to_string());
        Err(e)
    }

    /// End the session and wait for both tasks to stop. A connect still in
    /// its handshake is abandoned and returns an error.
    ///
    /// `connection_closed` is not called for an explicit disconnect.
    pub async fn disconnect(&self) {
        let session = {
            let mut inner = self.lock();
            inner.state = ConnState::Disconnected;
            inner.epoch += 1;
            if let Some(pending) = inner.pending.take() {
                pending.cancel();
            }
            inner.session.take()
        };
        let Some(session) = session else {
            return;
        };
        tracing::info!(client_id = session.client_id, "disconnecting");
        session.cancel.cancel();
        join_all(session.tasks).await;
    }

    /// Resolves when the current session ends, for whatever reason.
    /// Returns at once when there is no session.
    pub async fn closed(&self) {
        let token = self.lock().session.as_ref().map(|s| s.cancel.clone());
        if let Some(token) = token {
            token.cancelled().await;
        }
    }

    // ========================================================================
    // Request plumbing
    // ========================================================================

    pub(crate) fn report_error(&self, req_id: i32, condition: ClientError, detail: &str) {
        self.wrapper
            .error(req_id, 0, condition.code, &condition.with_detail(detail), "");
    }

    /// The live session's queue, or NOT_CONNECTED reported against `req_id`.
    pub(crate) fn check_connected(&self, req_id: i32) -> Option<Outbound> {
        let outbound = {
            let inner = self.lock();
            match (&inner.state, &inner.session) {
                (ConnState::Connected, Some(s)) if !s.cancel.is_cancelled() => Some(Outbound {
                    server_version: s.server_version,
                    tx: s.outbound.clone(),
                }),
                _ => None,
            }
        };
        if outbound.is_none() {
            self.report_error(req_id, NOT_CONNECTED, "");
        }
        outbound
    }

    /// False, with UPDATE_TWS reported, when the server predates `min_version`.
    pub(crate) fn check_version(&self, out: &Outbound, min_version: i32, req_id: i32, feature: &str) -> bool {
        if out.server_version >= min_version {
            return true;
        }
        tracing::warn!(
            req_id,
            server_version = out.server_version,
            min_version,
            feature,
            "request needs a newer server"
        );
        self.report_error(req_id, UPDATE_TWS, &format!("It does not support {feature}."));
        false
    }

    /// Finish `enc` and queue it. Waits while the queue is full.
    pub(crate) async fn send(&self, out: &Outbound, req_id: i32, enc: MessageEncoder) {
        let msg_id = enc.msg_id();
        let frame = match enc.finish() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(error = %e, msg_id, "request not encoded");
                self.report_error(req_id, e.client_error(), &e.to_string());
                return;
            }
        };
        let len = frame.len();
        if out.tx.send(frame).await.is_err() {
            self.report_error(req_id, NOT_CONNECTED, "");
            return;
        }
        tracing::trace!(msg_id, name = outgoing::name(msg_id).unwrap_or("?"), len, "request queued");
    }
}

impl Drop for IBClient {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn join_all(tasks: Vec<JoinHandle<()>>) {
    for task in tasks {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "session task panicked");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use bytes::Bytes;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::frame::encode_frame;
    use crate::protocol::HEADER_LEN;
    use crate::wrapper::tests::Recorder;

    /// A scripted TWS: answers the handshake with `server_version`, forwards
    /// every frame the client sends to `received` and writes whatever is
    /// pushed into `push`. Dropping `push` closes the socket.
    pub(crate) struct MockTws {
        pub port: u16,
        pub received: mpsc::UnboundedReceiver<Bytes>,
        pub push: Option<mpsc::UnboundedSender<Vec<u8>>>,
    }

    impl MockTws {
        pub async fn next(&mut self) -> Bytes {
            tokio::time::timeout(Duration::from_secs(5), self.received.recv())
                .await
                .expect("frame within 5s")
                .expect("client frame")
        }

        pub fn send_fields(&self, fields: &[&str]) {
            let payload = crate::decoder::tests::fields(fields);
            let frame = encode_frame(&payload).unwrap().to_vec();
            self.push.as_ref().unwrap().send(frame).unwrap();
        }

        pub fn close(&mut self) {
            self.push = None;
        }
    }

    pub(crate) async fn mock_tws(server_version: i32) -> MockTws {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (received_tx, received) = mpsc::unbounded_channel();
        let (push, mut push_rx) = mpsc::unbounded_channel::<Vec<u8>>();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut head = [0u8; 8];
            stream.read_exact(&mut head).await.unwrap();
            let len = u32::from_be_bytes([head[4], head[5], head[6], head[7]]) as usize;
            let mut version = vec![0u8; len];
            stream.read_exact(&mut version).await.unwrap();
            stream
                .write_all(format!("{server_version}\x0020230101 10:00:00\x00").as_bytes())
                .await
                .unwrap();

            let (mut rd, mut wr) = stream.into_split();
            tokio::spawn(async move {
                loop {
                    let mut header = [0u8; HEADER_LEN];
                    if rd.read_exact(&mut header).await.is_err() {
                        return;
                    }
                    let mut payload = vec![0u8; u32::from_be_bytes(header) as usize];
                    if rd.read_exact(&mut payload).await.is_err() {
                        return;
                    }
                    if received_tx.send(Bytes::from(payload)).is_err() {
                        return;
                    }
                }
            });
            while let Some(bytes) = push_rx.recv().await {
                if wr.write_all(&bytes).await.is_err() {
                    return;
                }
            }
        });

        MockTws {
            port,
            received,
            push: Some(push),
        }
    }

    /// A client connected to a fresh mock, START_API already consumed.
    pub(crate) async fn connected(server_version: i32) -> (IBClient, Arc<Recorder>, MockTws) {
        let mut tws = mock_tws(server_version).await;
        let rec = Arc::new(Recorder::default());
        let client = IBClient::new(rec.clone());
        client.connect("127.0.0.1", tws.port, 7, None, None).await.unwrap();
        let start = tws.next().await;
        assert!(start.starts_with(b"71\x002\x007\x00"));
        (client, rec, tws)
    }

    #[tokio::test]
    async fn handshake_then_start_api() {
        let (client, rec, _tws) = connected(176).await;
        assert!(client.is_connected());
        assert_eq!(client.server_version(), Some(176));
        assert_eq!(client.connection_time().as_deref(), Some("20230101 10:00:00"));
        assert_eq!(client.client_id(), Some(7));
        assert_eq!(rec.take(), vec!["connect ack"]);
        client.disconnect().await;
    }

    #[tokio::test]
    async fn requests_without_session_report_not_connected() {
        let rec = Arc::new(Recorder::default());
        let client = IBClient::new(rec.clone());
        client.req_current_time().await;
        client.cancel_mkt_data(12).await;
        assert_eq!(rec.take(), vec!["error -1 504 Not connected", "error 12 504 Not connected"]);
        assert_eq!(client.stats_snapshot().messages_sent, 0);
    }

    #[tokio::test]
    async fn second_connect_is_refused() {
        let (client, rec, tws) = connected(176).await;
        rec.take();
        let err = client.connect("127.0.0.1", tws.port, 7, None, None).await.unwrap_err();
        assert!(matches!(err, IBApiError::AlreadyConnected));
        assert_eq!(rec.take(), vec!["error -1 501 Already connected."]);
        assert!(client.is_connected());
        client.disconnect().await;
    }

    #[tokio::test]
    async fn refused_dial_reports_connect_fail() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let rec = Arc::new(Recorder::default());
        let client = IBClient::new(rec.clone());
        let err = client.connect("127.0.0.1", port, 0, None, None).await.unwrap_err();
        assert!(matches!(err, IBApiError::ConnectFailed(_)));
        assert_eq!(client.conn_state(), ConnState::Disconnected);
        let calls = rec.take();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("error -1 502 Couldn't connect to TWS."));
    }

    #[tokio::test]
    async fn disconnect_joins_tasks_without_closed_callback() {
        let (client, rec, mut tws) = connected(176).await;
        rec.take();
        client.disconnect().await;

        assert!(!client.is_connected());
        assert_eq!(client.server_version(), None);
        let sent = client.stats_snapshot().messages_sent;
        client.req_current_time().await;
        assert_eq!(client.stats_snapshot().messages_sent, sent);
        assert_eq!(rec.take(), vec!["error -1 504 Not connected"]);
        // The socket is closed once both halves are dropped.
        assert!(tokio::time::timeout(Duration::from_secs(5), tws.received.recv())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn server_close_ends_session() {
        let (client, rec, mut tws) = connected(176).await;
        tws.send_fields(&["49", "1", "1700000000"]);
        tws.close();
        tokio::time::timeout(Duration::from_secs(5), client.closed()).await.unwrap();

        assert!(!client.is_connected());
        // Give the reader a moment to finish its last callback.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(rec.take(), vec!["connect ack", "time 1700000000", "closed"]);

        // A new connect reaps the dead session first.
        let mut tws = mock_tws(176).await;
        client.connect("127.0.0.1", tws.port, 8, None, None).await.unwrap();
        assert!(tws.next().await.starts_with(b"71\x002\x008\x00"));
        client.disconnect().await;
    }

    #[tokio::test]
    async fn shutdown_token_ends_session_and_blocks_connect() {
        let (client, _rec, tws) = connected(176).await;
        client.shutdown_token().cancel();
        tokio::time::timeout(Duration::from_secs(5), client.closed()).await.unwrap();
        assert!(!client.is_connected());

        let err = client.connect("127.0.0.1", tws.port, 7, None, None).await.unwrap_err();
        assert!(matches!(err, IBApiError::ConnectFailed(_)));
        client.disconnect().await;
    }

    /// Accepts one client and reads its connect request, then answers after
    /// `reply_after`, or never. Yields whatever the client sends after that.
    async fn slow_tws(reply_after: Option<Duration>) -> (u16, JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut head = [0u8; 8];
            stream.read_exact(&mut head).await.unwrap();
            let len = u32::from_be_bytes([head[4], head[5], head[6], head[7]]) as usize;
            let mut version = vec![0u8; len];
            stream.read_exact(&mut version).await.unwrap();
            if let Some(delay) = reply_after {
                tokio::time::sleep(delay).await;
                // The client may already be gone.
                let _ = stream.write_all(b"176\x0020230101 10:00:00\x00").await;
            }
            let mut rest = Vec::new();
            let _ = stream.read_to_end(&mut rest).await;
            rest
        });
        (port, handle)
    }

    #[tokio::test]
    async fn silent_server_times_out_the_handshake() {
        let (port, _server) = slow_tws(None).await;
        let rec = Arc::new(Recorder::default());
        let client = IBClient::new(rec.clone());

        let err = tokio::time::timeout(
            Duration::from_secs(3),
            client.connect("127.0.0.1", port, 0, Some(Duration::from_millis(300)), None),
        )
        .await
        .unwrap()
        .unwrap_err();
        assert!(matches!(err, IBApiError::Timeout(_)));
        assert_eq!(client.conn_state(), ConnState::Disconnected);
        let calls = rec.take();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("error -1 502"));

        // Not stuck in Connecting: the next attempt goes through.
        let mut tws = mock_tws(176).await;
        client.connect("127.0.0.1", tws.port, 1, None, None).await.unwrap();
        assert!(tws.next().await.starts_with(b"71\x002\x001\x00"));
        client.disconnect().await;
    }

    #[tokio::test]
    async fn shutdown_interrupts_a_stalled_handshake() {
        let (port, _server) = slow_tws(None).await;
        let rec = Arc::new(Recorder::default());
        let client = IBClient::new(rec.clone());
        let shutdown = client.shutdown_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            shutdown.cancel();
        });

        let err = tokio::time::timeout(Duration::from_secs(3), client.connect("127.0.0.1", port, 0, None, None))
            .await
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, IBApiError::ConnectFailed(_)));
        assert_eq!(client.conn_state(), ConnState::Disconnected);
        assert!(rec.take()[0].starts_with("error -1 502"));
    }

    #[tokio::test]
    async fn disconnect_during_handshake_abandons_the_connect() {
        let (port, server) = slow_tws(Some(Duration::from_millis(300))).await;
        let rec = Arc::new(Recorder::default());
        let client = IBClient::new(rec.clone());

        let (result, ()) = tokio::join!(client.connect("127.0.0.1", port, 0, None, None), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            client.disconnect().await;
            assert_eq!(client.conn_state(), ConnState::Disconnected);
        });

        assert!(result.is_err());
        assert!(!client.is_connected());
        assert_eq!(client.conn_state(), ConnState::Disconnected);
        // No START_API or anything else followed the connect request.
        let rest = tokio::time::timeout(Duration::from_secs(3), server).await.unwrap().unwrap();
        assert!(rest.is_empty());
        let calls = rec.take();
        assert!(!calls.contains(&"connect ack".to_string()));
        assert!(calls.iter().all(|c| c.starts_with("error -1 502")));
    }

    #[tokio::test]
    async fn optional_capabilities_ride_on_start_api() {
        let mut tws = mock_tws(176).await;
        let client = IBClient::new(Arc::new(Recorder::default()));
        client.set_optional_capabilities("cap1");
        client.connect("127.0.0.1", tws.port, 3, None, None).await.unwrap();
        assert_eq!(&tws.next().await[..], b"71\x002\x003\x00cap1\x00");
        client.disconnect().await;
    }
}
