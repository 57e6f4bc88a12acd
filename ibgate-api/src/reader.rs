//! Reader task.
//!
//! Scans frames off the socket, decodes each one and dispatches it to the
//! wrapper before touching the next, so callbacks arrive in wire order.
//! Any read failure ends the session: the task cancels the shared token so
//! the writer stops too and `is_connected` turns false.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::connection::ConnectionReader;
use crate::decoder::decode_server_msg;
use crate::errors::IBApiError;
use crate::protocol::client_errors::BAD_MESSAGE;
use crate::protocol::NO_VALID_ID;
use crate::wrapper::{dispatch, Wrapper};

/// Owns the read half for the lifetime of one session.
pub struct MessageReader {
    reader: ConnectionReader,
    server_version: i32,
    wrapper: Arc<dyn Wrapper>,
    cancel: CancellationToken,
}

impl MessageReader {
    pub fn new(
        reader: ConnectionReader,
        server_version: i32,
        wrapper: Arc<dyn Wrapper>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            reader,
            server_version,
            wrapper,
            cancel,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::debug!("reader cancelled");
                    return;
                }
                next = self.reader.next_frame() => next,
            };

            let frame = match next {
                Ok(frame) => frame,
                Err(e) => {
                    self.fail(e);
                    return;
                }
            };
            if frame.is_empty() {
                continue;
            }

            match decode_server_msg(&frame, self.server_version) {
                Ok(event) => dispatch(event, self.wrapper.as_ref()),
                Err(e) => {
                    // No way to resynchronize inside a frame stream that
                    // disagrees with our field layout.
                    tracing::error!(error = %e, len = frame.len(), "undecodable frame, closing session");
                    self.wrapper
                        .error(NO_VALID_ID, 0, BAD_MESSAGE.code, &BAD_MESSAGE.with_detail(&e.to_string()), "");
                    self.cancel.cancel();
                    return;
                }
            }
        }
    }

    /// A socket-level failure: report it, stop the session, then tell the
    /// wrapper the connection is gone.
    fn fail(&self, e: IBApiError) {
        if self.cancel.is_cancelled() {
            return;
        }
        match &e {
            IBApiError::Disconnected(reason) => {
                tracing::info!(%reason, "server closed the connection");
            }
            _ => {
                tracing::error!(error = %e, "read failed");
                let condition = e.client_error();
                self.wrapper
                    .error(NO_VALID_ID, 0, condition.code, &condition.with_detail(&e.to_string()), "");
            }
        }
        self.cancel.cancel();
        self.wrapper.connection_closed();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    use crate::connection::{Connection, ConnectionStats};
    use crate::decoder::tests::fields;
    use crate::frame::encode_frame;

    #[derive(Default)]
    struct Seen(Mutex<Vec<String>>);

    impl Wrapper for Seen {
        fn next_valid_id(&self, order_id: i32) {
            self.0.lock().unwrap().push(format!("id {order_id}"));
        }
        fn error(&self, req_id: i32, _t: i64, code: i32, _m: &str, _j: &str) {
            self.0.lock().unwrap().push(format!("error {req_id} {code}"));
        }
        fn connection_closed(&self) {
            self.0.lock().unwrap().push("closed".into());
        }
    }

    async fn serve(frames: Vec<Vec<u8>>, linger: bool) -> ConnectionReader {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            for frame in frames {
                stream.write_all(&frame).await.unwrap();
            }
            if linger {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        });
        let conn = Connection::dial("127.0.0.1", port, None, Arc::new(ConnectionStats::new()))
            .await
            .unwrap();
        conn.reader
    }

    fn frame(items: &[&str]) -> Vec<u8> {
        encode_frame(&fields(items)).unwrap().to_vec()
    }

    #[tokio::test]
    async fn dispatches_in_order_then_reports_close() {
        let frames = vec![
            frame(&["9", "1", "1"]),
            encode_frame(b"").unwrap().to_vec(),
            frame(&["9", "1", "2"]),
        ];
        let seen = Arc::new(Seen::default());
        let cancel = CancellationToken::new();
        let reader = serve(frames, false).await;
        MessageReader::new(reader, 176, seen.clone(), cancel.clone())
            .spawn()
            .await
            .unwrap();

        assert!(cancel.is_cancelled());
        assert_eq!(*seen.0.lock().unwrap(), vec!["id 1", "id 2", "closed"]);
    }

    #[tokio::test]
    async fn malformed_field_reports_bad_message_and_cancels() {
        let frames = vec![frame(&["9", "1", "x"]), frame(&["9", "1", "3"])];
        let seen = Arc::new(Seen::default());
        let cancel = CancellationToken::new();
        let reader = serve(frames, true).await;
        MessageReader::new(reader, 176, seen.clone(), cancel.clone())
            .spawn()
            .await
            .unwrap();

        assert!(cancel.is_cancelled());
        assert_eq!(*seen.0.lock().unwrap(), vec!["error -1 508"]);
    }

    #[tokio::test]
    async fn cancellation_stops_a_blocked_reader_silently() {
        let seen = Arc::new(Seen::default());
        let cancel = CancellationToken::new();
        let reader = serve(vec![], true).await;
        let handle = MessageReader::new(reader, 176, seen.clone(), cancel.clone()).spawn();

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
        assert!(seen.0.lock().unwrap().is_empty());
    }
}
