//! Writer task.
//!
//! Drains the outbound queue into the socket one frame at a time. A failed
//! write is reported and dropped; the next frame is tried on its own. Only
//! cancellation, or every sender going away, ends the task.

use std::sync::Arc;

use bytes::BytesMut;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::connection::ConnectionWriter;
use crate::protocol::client_errors::SOCKET_EXCEPTION;
use crate::protocol::NO_VALID_ID;
use crate::wrapper::Wrapper;

pub struct MessageWriter {
    writer: ConnectionWriter,
    outbound: mpsc::Receiver<BytesMut>,
    wrapper: Arc<dyn Wrapper>,
    cancel: CancellationToken,
}

impl MessageWriter {
    pub fn new(
        writer: ConnectionWriter,
        outbound: mpsc::Receiver<BytesMut>,
        wrapper: Arc<dyn Wrapper>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            writer,
            outbound,
            wrapper,
            cancel,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        loop {
            let frame = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                frame = self.outbound.recv() => match frame {
                    Some(frame) => frame,
                    None => break,
                },
            };

            let write = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                write = self.writer.write_frame(&frame) => write,
            };
            if let Err(e) = write {
                tracing::warn!(error = %e, len = frame.len(), "write failed, frame dropped");
                self.wrapper.error(
                    NO_VALID_ID,
                    0,
                    SOCKET_EXCEPTION.code,
                    &SOCKET_EXCEPTION.with_detail(&e.to_string()),
                    "",
                );
            }
        }
        self.outbound.close();
        self.writer.shutdown().await;
        tracing::debug!("writer stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    use crate::connection::{Connection, ConnectionStats};
    use crate::frame::encode_frame;
    use crate::wrapper::tests::Recorder;
    use crate::wrapper::LoggingWrapper;

    async fn wait_for_calls(rec: &Recorder, count: usize) -> Vec<String> {
        for _ in 0..500 {
            if rec.calls.lock().unwrap().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        rec.take()
    }

    #[tokio::test]
    async fn writes_in_queue_order_and_stops_on_cancel() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            stream.read_to_end(&mut received).await.unwrap();
            received
        });

        let stats = Arc::new(ConnectionStats::new());
        let conn = Connection::dial("127.0.0.1", port, None, Arc::clone(&stats)).await.unwrap();
        let (tx, rx) = mpsc::channel(2);
        let cancel = CancellationToken::new();
        let handle = MessageWriter::new(conn.writer, rx, Arc::new(LoggingWrapper), cancel.clone()).spawn();

        let mut expected = Vec::new();
        for i in 0..5 {
            let frame = encode_frame(format!("{i}\0").as_bytes()).unwrap();
            expected.extend_from_slice(&frame);
            tx.send(frame).await.unwrap();
        }
        // Let the queue drain before cancelling.
        while stats.snapshot().messages_sent < 5 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        cancel.cancel();
        handle.await.unwrap();
        drop(conn.reader);

        assert_eq!(server.await.unwrap(), expected);
        assert!(tx.send(BytesMut::new()).await.is_err());
    }

    #[tokio::test]
    async fn failed_write_is_reported_and_the_writer_keeps_going() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let _ = stream.read_to_end(&mut received).await;
        });

        let stats = Arc::new(ConnectionStats::new());
        let conn = Connection::dial("127.0.0.1", port, None, Arc::clone(&stats)).await.unwrap();
        let mut writer = conn.writer;
        // Every write after our own FIN fails.
        writer.shutdown().await;

        let rec = Arc::new(Recorder::default());
        let (tx, rx) = mpsc::channel(2);
        let cancel = CancellationToken::new();
        let handle = MessageWriter::new(writer, rx, rec.clone(), cancel.clone()).spawn();

        tx.send(encode_frame(b"49\x001\x00").unwrap()).await.unwrap();
        let calls = wait_for_calls(&rec, 1).await;
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("error -1 509"));
        assert!(!cancel.is_cancelled());

        // The next frame is still taken and attempted.
        tx.send(encode_frame(b"49\x001\x00").unwrap()).await.unwrap();
        let calls = wait_for_calls(&rec, 1).await;
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("error -1 509"));
        assert!(!cancel.is_cancelled());
        assert!(!handle.is_finished());
        assert_eq!(stats.snapshot().messages_sent, 0);

        cancel.cancel();
        handle.await.unwrap();
        drop(conn.reader);
    }
}
