//! TCP connection to TWS/Gateway.
//!
//! [`Connection::dial`] opens the socket and splits it into a
//! [`ConnectionReader`] and a [`ConnectionWriter`]. The reader half is owned
//! by the reader task and the writer half by the writer task, so the socket
//! itself is never shared. The only state both halves touch is the
//! [`ConnectionStats`] counters.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::errors::{IBApiError, Result};
use crate::frame::FrameScanner;
use crate::protocol::HEADER_LEN;

// ============================================================================
// Statistics
// ============================================================================

/// Point-in-time copy of the connection counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub messages_sent: u64,
    pub messages_received: u64,
}

/// Byte and message counters shared by the reader and writer halves.
///
/// All four counters sit behind one mutex, so a snapshot never mixes values
/// from before and after a concurrent update or reset.
#[derive(Debug, Default)]
pub struct ConnectionStats {
    counters: Mutex<StatsSnapshot>,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StatsSnapshot> {
        // Counters stay meaningful even if a holder panicked.
        self.counters.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record_sent(&self, bytes: usize) {
        let mut c = self.lock();
        c.bytes_sent += bytes as u64;
        c.messages_sent += 1;
    }

    pub fn record_received(&self, bytes: usize) {
        let mut c = self.lock();
        c.bytes_received += bytes as u64;
        c.messages_received += 1;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        *self.lock()
    }

    /// Zero all four counters at once.
    pub fn reset(&self) {
        *self.lock() = StatsSnapshot::default();
    }
}

// ============================================================================
// Connection
// ============================================================================

/// A connected socket, already split into its two halves.
pub struct Connection {
    pub reader: ConnectionReader,
    pub writer: ConnectionWriter,
}

impl Connection {
    /// Open a TCP connection, optionally bounded by `timeout`.
    ///
    /// Dial failures are reported as [`IBApiError::ConnectFailed`] and an
    /// expired timeout as [`IBApiError::Timeout`], never as plain I/O errors.
    pub async fn dial(
        host: &str,
        port: u16,
        timeout: Option<Duration>,
        stats: Arc<ConnectionStats>,
    ) -> Result<Self> {
        let addr = format!("{host}:{port}");
        let connect = TcpStream::connect(&addr);
        let stream = match timeout {
            Some(limit) => tokio::time::timeout(limit, connect)
                .await
                .map_err(|_| IBApiError::Timeout(format!("connecting to {addr} took longer than {limit:?}")))?,
            None => connect.await,
        }
        .map_err(|e| IBApiError::ConnectFailed(format!("failed to connect to {addr}: {e}")))?;

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "could not set TCP_NODELAY");
        }
        tracing::debug!(%addr, "socket connected");

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: ConnectionReader {
                inner: read_half,
                scanner: FrameScanner::new(),
                stats: Arc::clone(&stats),
            },
            writer: ConnectionWriter {
                inner: write_half,
                stats,
            },
        })
    }
}

// ============================================================================
// Read half
// ============================================================================

/// Read half of the socket together with its frame scanner.
pub struct ConnectionReader {
    inner: OwnedReadHalf,
    scanner: FrameScanner,
    stats: Arc<ConnectionStats>,
}

impl ConnectionReader {
    /// Read once from the socket into the scan buffer.
    ///
    /// A closed socket is [`IBApiError::Disconnected`]. Cancel safe: bytes
    /// already read stay buffered.
    pub async fn fill(&mut self) -> Result<usize> {
        let n = self.inner.read_buf(self.scanner.buffer_mut()).await?;
        if n == 0 {
            return Err(IBApiError::Disconnected("connection closed by server".into()));
        }
        Ok(n)
    }

    pub fn scanner_mut(&mut self) -> &mut FrameScanner {
        &mut self.scanner
    }

    /// Next complete frame payload, reading from the socket as needed.
    pub async fn next_frame(&mut self) -> Result<Bytes> {
        loop {
            if let Some(frame) = self.scanner.next_frame()? {
                self.stats.record_received(HEADER_LEN + frame.len());
                return Ok(frame);
            }
            self.fill().await?;
        }
    }
}

// ============================================================================
// Write half
// ============================================================================

/// Write half of the socket.
pub struct ConnectionWriter {
    inner: OwnedWriteHalf,
    stats: Arc<ConnectionStats>,
}

impl ConnectionWriter {
    /// Write one encoded frame in full and flush it.
    pub async fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.inner.write_all(frame).await?;
        self.inner.flush().await?;
        self.stats.record_sent(frame.len());
        Ok(())
    }

    /// Send FIN. Errors are ignored; the socket is going away anyway.
    pub async fn shutdown(&mut self) {
        let _ = self.inner.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    use crate::frame::encode_frame;

    #[test]
    fn stats_snapshot_and_reset() {
        let stats = ConnectionStats::new();
        stats.record_sent(10);
        stats.record_sent(5);
        stats.record_received(7);
        assert_eq!(
            stats.snapshot(),
            StatsSnapshot {
                bytes_sent: 15,
                bytes_received: 7,
                messages_sent: 2,
                messages_received: 1,
            }
        );
        stats.reset();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[tokio::test]
    async fn dial_refused_is_connect_failure() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = Connection::dial("127.0.0.1", port, None, Arc::new(ConnectionStats::new())).await;
        assert!(matches!(result, Err(IBApiError::ConnectFailed(_))));
    }

    #[tokio::test]
    async fn frames_are_counted_both_ways() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 9];
            stream.read_exact(&mut buf).await.unwrap();
            // Echo back in two pieces.
            stream.write_all(&buf[..3]).await.unwrap();
            stream.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
            stream.write_all(&buf[3..]).await.unwrap();
        });

        let stats = Arc::new(ConnectionStats::new());
        let mut conn = Connection::dial("127.0.0.1", port, Some(Duration::from_secs(5)), Arc::clone(&stats))
            .await
            .unwrap();
        let frame = encode_frame(b"49\x001\x00").unwrap();
        conn.writer.write_frame(&frame).await.unwrap();

        let echoed = conn.reader.next_frame().await.unwrap();
        assert_eq!(&echoed[..], b"49\x001\x00");
        assert_eq!(
            stats.snapshot(),
            StatsSnapshot {
                bytes_sent: 9,
                bytes_received: 9,
                messages_sent: 1,
                messages_received: 1,
            }
        );

        server.await.unwrap();
        assert!(matches!(conn.reader.next_frame().await, Err(IBApiError::Disconnected(_))));
    }
}
