//! Session handshake.
//!
//! The client opens with `API\0` and a framed `v<min>..<max>` version range.
//! The server answers with two fields: its version and its connection time.
//! Modern servers frame that reply, older ones send the two NUL-terminated
//! fields bare, so the first reply byte decides how it is read. Any bytes
//! that arrive after the reply stay buffered in the reader's scanner for
//! the reader task.

use bytes::BytesMut;

use crate::connection::Connection;
use crate::decoder::MessageDecoder;
use crate::encoder::{build_connect_request, MessageEncoder};
use crate::errors::{IBApiError, Result};
use crate::protocol::{outgoing, server_version, MAX_CLIENT_VER, MIN_CLIENT_VER};

/// START_API message version.
const START_API_VERSION: i32 = 2;

/// Outcome of a successful handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub server_version: i32,
    pub connection_time: String,
}

/// Send the connect request and read the server's reply.
///
/// A negative server version is a redirect and fails with
/// [`IBApiError::Redirect`] carrying the `host:port` target. A version
/// outside `MIN_CLIENT_VER..=MAX_CLIENT_VER` fails with
/// [`IBApiError::UnsupportedVersion`].
pub async fn handshake(conn: &mut Connection, connect_options: Option<&str>) -> Result<Handshake> {
    let request = build_connect_request(connect_options)?;
    conn.writer.write_frame(&request).await?;

    let (version_text, second) = read_reply(conn).await?;
    let server_version: i32 = version_text
        .parse()
        .map_err(|e| IBApiError::decoding("server version", &version_text, e))?;

    if server_version < 0 {
        tracing::warn!(target_addr = %second, "server redirected the connection");
        return Err(IBApiError::Redirect(second));
    }
    if !(MIN_CLIENT_VER..=MAX_CLIENT_VER).contains(&server_version) {
        tracing::warn!(
            server_version,
            min = MIN_CLIENT_VER,
            max = MAX_CLIENT_VER,
            "server version outside supported range"
        );
        return Err(IBApiError::UnsupportedVersion(server_version));
    }

    tracing::info!(server_version, connection_time = %second, "handshake complete");
    Ok(Handshake {
        server_version,
        connection_time: second,
    })
}

/// The two reply fields, in either wire form.
async fn read_reply(conn: &mut Connection) -> Result<(String, String)> {
    loop {
        let scanner = conn.reader.scanner_mut();
        match scanner.looks_framed() {
            Some(true) => {
                if let Some(frame) = scanner.next_frame()? {
                    let mut dec = MessageDecoder::new(&frame, 0);
                    return Ok((dec.decode_string()?, dec.decode_string()?));
                }
            }
            Some(false) => {
                if let Some(mut fields) = scanner.next_unframed_fields(2)? {
                    let second = fields.pop().unwrap_or_default();
                    let first = fields.pop().unwrap_or_default();
                    return Ok((first, second));
                }
            }
            None => {}
        }
        conn.reader.fill().await?;
    }
}

/// Encode START_API: version 2, the client id, and optional capabilities
/// for servers that understand them.
pub fn start_api_frame(
    server_version: i32,
    client_id: i32,
    optional_capabilities: Option<&str>,
) -> Result<BytesMut> {
    let mut enc = MessageEncoder::new(server_version, outgoing::START_API);
    enc.push_int(START_API_VERSION).push_int(client_id);
    if server_version >= server_version::OPTIONAL_CAPABILITIES {
        enc.push_str(optional_capabilities.unwrap_or(""));
    }
    enc.finish()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use crate::connection::ConnectionStats;
    use crate::frame::encode_frame;
    use crate::protocol::HEADER_LEN;

    /// Accepts one client, checks the connect request and answers with `reply`.
    async fn mock_tws(reply: Vec<u8>) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut head = [0u8; 8];
            stream.read_exact(&mut head).await.unwrap();
            assert_eq!(&head[..4], b"API\0");
            let len = u32::from_be_bytes([head[4], head[5], head[6], head[7]]) as usize;
            let mut version = vec![0u8; len];
            stream.read_exact(&mut version).await.unwrap();
            assert!(version.starts_with(b"v100..200"));

            stream.write_all(&reply).await.unwrap();
            // Hold the socket open until the client is done.
            let mut sink = [0u8; 64];
            let _ = stream.read(&mut sink).await;
        });
        port
    }

    async fn dial(port: u16) -> Connection {
        Connection::dial("127.0.0.1", port, None, Arc::new(ConnectionStats::new()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn legacy_unframed_reply() {
        let port = mock_tws(b"176\x0020230101 10:00:00\x00".to_vec()).await;
        let mut conn = dial(port).await;
        let hs = handshake(&mut conn, None).await.unwrap();
        assert_eq!(hs.server_version, 176);
        assert_eq!(hs.connection_time, "20230101 10:00:00");
    }

    #[tokio::test]
    async fn framed_reply_keeps_trailing_frames() {
        let mut reply = encode_frame(b"200\x0020260101 12:00:00 EST\x00").unwrap().to_vec();
        reply.extend_from_slice(&encode_frame(b"9\x001\x00100\x00").unwrap());
        let port = mock_tws(reply).await;

        let mut conn = dial(port).await;
        let hs = handshake(&mut conn, Some("+PACEAPI")).await.unwrap();
        assert_eq!(hs.server_version, 200);
        assert_eq!(hs.connection_time, "20260101 12:00:00 EST");

        let next = conn.reader.next_frame().await.unwrap();
        assert_eq!(&next[..], b"9\x001\x00100\x00");
    }

    #[tokio::test]
    async fn negative_version_is_redirect() {
        let port = mock_tws(b"-1\x0010.0.0.1:4002\x00".to_vec()).await;
        let mut conn = dial(port).await;
        match handshake(&mut conn, None).await {
            Err(IBApiError::Redirect(target)) => assert_eq!(target, "10.0.0.1:4002"),
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn out_of_range_versions_are_rejected() {
        for version in ["99", "201"] {
            let reply = format!("{version}\x00time\x00").into_bytes();
            let port = mock_tws(reply).await;
            let mut conn = dial(port).await;
            match handshake(&mut conn, None).await {
                Err(IBApiError::UnsupportedVersion(v)) => assert_eq!(v.to_string(), version),
                other => panic!("expected unsupported version, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn server_closing_mid_reply_is_disconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 64];
            let _ = stream.read(&mut buf).await.unwrap();
            stream.write_all(b"17").await.unwrap();
        });

        let mut conn = dial(port).await;
        assert!(matches!(
            handshake(&mut conn, None).await,
            Err(IBApiError::Disconnected(_)) | Err(IBApiError::Io(_))
        ));
    }

    #[test]
    fn start_api_layout() {
        let frame = start_api_frame(176, 7, None).unwrap();
        assert_eq!(&frame[HEADER_LEN..], b"71\x002\x007\x00\x00");

        let frame = start_api_frame(176, 7, Some("cap")).unwrap();
        assert_eq!(&frame[HEADER_LEN..], b"71\x002\x007\x00cap\x00");
    }
}
