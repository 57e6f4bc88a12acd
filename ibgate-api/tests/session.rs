//! Session scenarios against a scripted TWS on 127.0.0.1.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use ibgate_api::models::account::Position;
use ibgate_api::{encode_frame, ConnState, IBApiError, IBClient, Wrapper};

// ============================================================================
// Helpers
// ============================================================================

#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

impl Recorder {
    fn push(&self, line: String) {
        self.0.lock().unwrap().push(line);
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }

    async fn wait_for(&self, count: usize) -> Vec<String> {
        for _ in 0..500 {
            if self.0.lock().unwrap().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.take()
    }
}

impl Wrapper for Recorder {
    fn connect_ack(&self) {
        self.push("connect ack".into());
    }
    fn connection_closed(&self) {
        self.push("closed".into());
    }
    fn next_valid_id(&self, order_id: i32) {
        self.push(format!("next id {order_id}"));
    }
    fn error(&self, req_id: i32, _error_time: i64, code: i32, _message: &str, _json: &str) {
        self.push(format!("error {req_id} {code}"));
    }
    fn position(&self, position: &Position) {
        self.push(format!("position {} {:?}", position.contract.symbol, position.position));
    }
}

/// Sink that takes a few milliseconds per callback, varying with the id.
#[derive(Default)]
struct SlowSink(Recorder);

impl Wrapper for SlowSink {
    fn connect_ack(&self) {
        self.0.push("connect ack".into());
    }
    fn next_valid_id(&self, order_id: i32) {
        std::thread::sleep(Duration::from_millis((order_id % 4) as u64));
        self.0.push(format!("next id {order_id}"));
    }
}

/// Accept one client and complete the handshake with `reply`.
async fn accept(listener: &TcpListener, reply: &[u8]) -> TcpStream {
    let (mut stream, _) = listener.accept().await.unwrap();
    let mut head = [0u8; 8];
    stream.read_exact(&mut head).await.unwrap();
    assert_eq!(&head[..4], b"API\0");
    let len = u32::from_be_bytes([head[4], head[5], head[6], head[7]]) as usize;
    let mut version = vec![0u8; len];
    stream.read_exact(&mut version).await.unwrap();
    assert!(version.starts_with(b"v100..200"));
    stream.write_all(reply).await.unwrap();
    stream
}

async fn read_frame(stream: &mut TcpStream) -> Vec<u8> {
    let mut header = [0u8; 4];
    tokio::time::timeout(Duration::from_secs(5), stream.read_exact(&mut header))
        .await
        .unwrap()
        .unwrap();
    let mut payload = vec![0u8; u32::from_be_bytes(header) as usize];
    stream.read_exact(&mut payload).await.unwrap();
    payload
}

fn frame(fields: &[&str]) -> Vec<u8> {
    let mut payload = Vec::new();
    for f in fields {
        payload.extend_from_slice(f.as_bytes());
        payload.push(0);
    }
    encode_frame(&payload).unwrap().to_vec()
}

async fn listen() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn legacy_handshake_then_start_api() {
    let (listener, port) = listen().await;
    let server = tokio::spawn(async move {
        let mut stream = accept(&listener, b"176\x0020230101 10:00:00\x00").await;
        let start = read_frame(&mut stream).await;
        (stream, start)
    });

    let rec = Arc::new(Recorder::default());
    let client = IBClient::new(rec.clone());
    client.connect("127.0.0.1", port, 3, None, None).await.unwrap();

    assert_eq!(client.server_version(), Some(176));
    assert_eq!(client.connection_time().as_deref(), Some("20230101 10:00:00"));
    assert_eq!(client.conn_state(), ConnState::Connected);

    let (_stream, start) = server.await.unwrap();
    assert_eq!(start, b"71\x002\x003\x00\x00");
    assert_eq!(rec.take(), vec!["connect ack"]);
    client.disconnect().await;
}

#[tokio::test]
async fn framed_handshake_with_trailing_messages() {
    let (listener, port) = listen().await;
    let server = tokio::spawn(async move {
        let mut reply = encode_frame(b"200\x0020260101 12:00:00 EST\x00").unwrap().to_vec();
        reply.extend_from_slice(&frame(&["9", "1", "42"]));
        let mut stream = accept(&listener, &reply).await;
        let _start = read_frame(&mut stream).await;
        stream
    });

    let rec = Arc::new(Recorder::default());
    let client = IBClient::new(rec.clone());
    client
        .connect("127.0.0.1", port, 0, Some(Duration::from_secs(2)), Some("+PACEAPI"))
        .await
        .unwrap();
    let _stream = server.await.unwrap();

    assert_eq!(client.server_version(), Some(200));
    // The id that arrived with the reply is delivered after connect_ack.
    assert_eq!(rec.wait_for(2).await, vec!["connect ack", "next id 42"]);
    client.disconnect().await;
}

#[tokio::test]
async fn callbacks_keep_wire_order() {
    const N: i32 = 200;
    let (listener, port) = listen().await;
    let server = tokio::spawn(async move {
        let mut stream = accept(&listener, b"176\x00t\x00").await;
        let _start = read_frame(&mut stream).await;
        let mut burst = Vec::new();
        for id in 1..=N {
            burst.extend_from_slice(&frame(&["9", "1", &id.to_string()]));
        }
        stream.write_all(&burst).await.unwrap();
        stream
    });

    let rec = Arc::new(Recorder::default());
    let client = IBClient::new(rec.clone());
    client.connect("127.0.0.1", port, 0, None, None).await.unwrap();
    let _stream = server.await.unwrap();

    let seen = rec.wait_for(N as usize + 1).await;
    let mut expected = vec!["connect ack".to_string()];
    expected.extend((1..=N).map(|id| format!("next id {id}")));
    assert_eq!(seen, expected);
    client.disconnect().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn slow_callbacks_keep_wire_order() {
    const N: i32 = 60;
    let (listener, port) = listen().await;
    let server = tokio::spawn(async move {
        let mut stream = accept(&listener, b"176\x00t\x00").await;
        let _start = read_frame(&mut stream).await;
        for id in 1..=N {
            stream.write_all(&frame(&["9", "1", &id.to_string()])).await.unwrap();
        }
        stream
    });

    let sink = Arc::new(SlowSink::default());
    let client = IBClient::new(sink.clone());
    client.connect("127.0.0.1", port, 0, None, None).await.unwrap();
    let _stream = server.await.unwrap();

    let seen = sink.0.wait_for(N as usize + 1).await;
    let mut expected = vec!["connect ack".to_string()];
    expected.extend((1..=N).map(|id| format!("next id {id}")));
    assert_eq!(seen, expected);
    client.disconnect().await;
}

#[tokio::test]
async fn disconnect_stops_all_socket_traffic() {
    let (listener, port) = listen().await;
    let (got_request, requested) = tokio::sync::oneshot::channel();
    let server = tokio::spawn(async move {
        let mut stream = accept(&listener, b"176\x00t\x00").await;
        let _start = read_frame(&mut stream).await;
        let current_time = read_frame(&mut stream).await;
        got_request.send(()).unwrap();
        // Nothing may follow once the client has disconnected.
        let mut rest = Vec::new();
        stream.read_to_end(&mut rest).await.unwrap();
        (current_time, rest)
    });

    let rec = Arc::new(Recorder::default());
    let client = IBClient::new(rec.clone());
    client.connect("127.0.0.1", port, 0, None, None).await.unwrap();
    client.req_current_time().await;
    requested.await.unwrap();
    client.disconnect().await;

    assert!(!client.is_connected());
    client.req_current_time().await;

    let (current_time, rest) = server.await.unwrap();
    assert_eq!(current_time, b"49\x001\x00");
    assert!(rest.is_empty());
    assert_eq!(rec.take(), vec!["connect ack", "error -1 504"]);
}

#[tokio::test]
async fn requests_before_connect_report_not_connected() {
    let rec = Arc::new(Recorder::default());
    let client = IBClient::new(rec.clone());
    client.req_positions().await;
    client.cancel_mkt_data(5).await;
    assert_eq!(rec.take(), vec!["error -1 504", "error 5 504"]);
    assert_eq!(client.conn_state(), ConnState::Disconnected);
}

#[tokio::test]
async fn old_server_gets_update_tws_and_no_frame() {
    let (listener, port) = listen().await;
    let server = tokio::spawn(async move {
        let mut stream = accept(&listener, b"140\x00t\x00").await;
        let _start = read_frame(&mut stream).await;
        read_frame(&mut stream).await
    });

    let rec = Arc::new(Recorder::default());
    let client = IBClient::new(rec.clone());
    client.connect("127.0.0.1", port, 0, None, None).await.unwrap();
    client.req_completed_orders(true).await;
    client.req_user_info(8).await;
    client.req_managed_accts().await;

    assert_eq!(server.await.unwrap(), b"17\x001\x00");
    assert_eq!(rec.take(), vec!["connect ack", "error -1 503", "error 8 503"]);
    client.disconnect().await;
}

#[tokio::test]
async fn unset_decimal_position_decodes_as_none() {
    let (listener, port) = listen().await;
    let server = tokio::spawn(async move {
        let mut stream = accept(&listener, b"176\x00t\x00").await;
        let _start = read_frame(&mut stream).await;
        let _req = read_frame(&mut stream).await;
        stream
            .write_all(&frame(&[
                "61", "3", "DU1", "265598", "AAPL", "STK", "", "", "", "", "SMART", "USD", "AAPL", "NMS",
                "9223372036854775807", "0",
            ]))
            .await
            .unwrap();
        stream
    });

    let rec = Arc::new(Recorder::default());
    let client = IBClient::new(rec.clone());
    client.connect("127.0.0.1", port, 0, None, None).await.unwrap();
    client.req_positions().await;
    let _stream = server.await.unwrap();

    assert_eq!(rec.wait_for(2).await, vec!["connect ack", "position AAPL None"]);
    client.disconnect().await;
}

#[tokio::test]
async fn server_close_fires_connection_closed() {
    let (listener, port) = listen().await;
    tokio::spawn(async move {
        let mut stream = accept(&listener, b"176\x00t\x00").await;
        let _start = read_frame(&mut stream).await;
    });

    let rec = Arc::new(Recorder::default());
    let client = IBClient::new(rec.clone());
    client.connect("127.0.0.1", port, 0, None, None).await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), client.closed()).await.unwrap();

    assert!(!client.is_connected());
    assert_eq!(rec.wait_for(2).await, vec!["connect ack", "closed"]);
    client.disconnect().await;
}

#[tokio::test]
async fn redirect_is_reported_not_followed() {
    let (listener, port) = listen().await;
    tokio::spawn(async move {
        let _stream = accept(&listener, b"-1\x0010.0.0.9:4001\x00").await;
        tokio::time::sleep(Duration::from_secs(1)).await;
    });

    let rec = Arc::new(Recorder::default());
    let client = IBClient::new(rec.clone());
    let err = client.connect("127.0.0.1", port, 0, None, None).await.unwrap_err();

    assert!(matches!(err, IBApiError::Redirect(ref target) if target == "10.0.0.9:4001"));
    assert_eq!(client.conn_state(), ConnState::Redirect);
    assert_eq!(rec.take(), vec!["error -1 502"]);
}
