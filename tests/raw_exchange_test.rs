//! Raw exchange coverage against scripted local servers.
//!
//! Covers:
//! - Byte-exact payload delivery, with nothing generated around it
//! - Response framing: Content-Length, chunked, read-to-close, no-body statuses
//! - Body replay after the connection is closed
//! - Header order, reason phrase, and interim status passthrough

use rawwire::{Client, WireError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Accept one connection, read until `expect_len` request bytes arrive,
/// answer with `response`, then drain to EOF so the capture also proves
/// no extra bytes followed.
async fn script_server(
    expect_len: usize,
    response: &'static [u8],
) -> (String, oneshot::Receiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut seen = Vec::new();
        let mut buf = [0u8; 4096];
        while seen.len() < expect_len {
            let n = sock.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            seen.extend_from_slice(&buf[..n]);
        }
        sock.write_all(response).await.unwrap();
        // Half-close so read-to-EOF bodies terminate, then drain what the
        // client sends until it closes its side.
        sock.shutdown().await.unwrap();
        loop {
            match sock.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => seen.extend_from_slice(&buf[..n]),
            }
        }
        let _ = tx.send(seen);
    });
    (format!("http://127.0.0.1:{}", addr.port()), rx)
}

#[tokio::test]
async fn test_payload_crosses_wire_byte_exact() {
    // A request no conventional client would emit: conflicting framing
    // headers, a lowercase verb, and a bare LF in the middle.
    let payload: &[u8] =
        b"post / HTTP/1.1\nHost: victim\r\nContent-Length: 3\r\nTransfer-Encoding: chunked\r\n\r\nabc";
    let (url, seen) = script_server(
        payload.len(),
        b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok",
    )
    .await;

    let client = Client::new();
    let resp = client.raw(&url, payload).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(seen.await.unwrap(), payload);
}

#[tokio::test]
async fn test_no_request_line_is_generated() {
    // The payload is not even HTTP. Nothing should be added around it.
    let payload = b"\x00\x01\x02 definitely not http\r\n";
    let (url, seen) = script_server(
        payload.len(),
        b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n",
    )
    .await;

    let client = Client::new();
    let resp = client.raw(&url, payload.as_slice()).await.unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    assert_eq!(seen.await.unwrap(), payload);
}

#[tokio::test]
async fn test_chunked_body_reassembled() {
    let (url, _seen) = script_server(
        1,
        b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n",
    )
    .await;

    let client = Client::new();
    let resp = client
        .raw(&url, "GET / HTTP/1.1\r\nHost: x\r\n\r\n")
        .await
        .unwrap();
    assert_eq!(
        resp.headers().get("transfer-encoding").unwrap(),
        "chunked"
    );
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"hello world");
}

#[tokio::test]
async fn test_body_runs_to_connection_close() {
    // No Content-Length, no chunking: the body is everything until EOF.
    let (url, _seen) = script_server(1, b"HTTP/1.1 200 OK\r\n\r\nall the way to the end").await;

    let client = Client::new();
    let resp = client
        .raw(&url, "GET / HTTP/1.1\r\nHost: x\r\n\r\n")
        .await
        .unwrap();
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"all the way to the end");
}

#[tokio::test]
async fn test_status_204_has_no_body() {
    let (url, _seen) = script_server(1, b"HTTP/1.1 204 No Content\r\n\r\n").await;

    let client = Client::new();
    let resp = client
        .raw(&url, "DELETE /thing HTTP/1.1\r\nHost: x\r\n\r\n")
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);
    assert!(resp.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_head_payload_ignores_stated_length() {
    // The response head claims a body that will never come. Because the
    // handwritten request line says HEAD, the exchange must not wait.
    let (url, _seen) = script_server(1, b"HTTP/1.1 200 OK\r\nContent-Length: 4096\r\n\r\n").await;

    let client = Client::new();
    let resp = client
        .raw(&url, "HEAD / HTTP/1.1\r\nHost: x\r\n\r\n")
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.headers().get("content-length").unwrap(), "4096");
    assert!(resp.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_interim_100_is_returned_as_the_response() {
    // One write, one framed read. An interim status is what came back,
    // so an interim status is what the caller gets.
    let (url, _seen) = script_server(1, b"HTTP/1.1 100 Continue\r\n\r\n").await;

    let client = Client::new();
    let resp = client
        .raw(
            &url,
            "POST / HTTP/1.1\r\nHost: x\r\nExpect: 100-continue\r\nContent-Length: 5\r\n\r\n",
        )
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 100);
    assert!(resp.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reason_phrase_preserved_verbatim() {
    let (url, _seen) =
        script_server(1, b"HTTP/1.1 299 Cache Hit Probably\r\nContent-Length: 0\r\n\r\n").await;

    let client = Client::new();
    let resp = client
        .raw(&url, "GET / HTTP/1.1\r\nHost: x\r\n\r\n")
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 299);
    assert_eq!(resp.reason(), Some("Cache Hit Probably"));
}

#[tokio::test]
async fn test_repeated_headers_keep_arrival_order() {
    let (url, _seen) = script_server(
        1,
        b"HTTP/1.1 200 OK\r\nSet-Cookie: first=1\r\nVia: proxy-a\r\nSet-Cookie: second=2\r\nContent-Length: 0\r\n\r\n",
    )
    .await;

    let client = Client::new();
    let resp = client
        .raw(&url, "GET / HTTP/1.1\r\nHost: x\r\n\r\n")
        .await
        .unwrap();
    let cookies: Vec<_> = resp.headers().get_all("set-cookie").iter().collect();
    assert_eq!(cookies, vec!["first=1", "second=2"]);
}

#[tokio::test]
async fn test_body_survives_connection_close() {
    let (url, seen) = script_server(
        1,
        b"HTTP/1.1 200 OK\r\nContent-Length: 8\r\n\r\nreplayme",
    )
    .await;

    let client = Client::new();
    let resp = client
        .raw(&url, "GET / HTTP/1.1\r\nHost: x\r\n\r\n")
        .await
        .unwrap();

    // The server task only finishes once it has seen EOF from us, so the
    // connection is fully gone here.
    seen.await.unwrap();

    let body = resp.body().as_bytes().unwrap().clone();
    assert_eq!(body.as_ref(), b"replayme");
    // Read again; a buffered body does not drain.
    assert_eq!(resp.body().as_bytes().unwrap().as_ref(), b"replayme");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"replayme");
}

#[tokio::test]
async fn test_truncated_head_is_parse_error() {
    let (url, _seen) = script_server(1, b"HTTP/1.1 200 OK\r\nContent-Le").await;

    let client = Client::new();
    let err = client
        .raw(&url, "GET / HTTP/1.1\r\nHost: x\r\n\r\n")
        .await
        .unwrap_err();
    assert!(matches!(err, WireError::ResponseParse(_)));
}

#[tokio::test]
async fn test_truncated_body_is_read_error() {
    let (url, _seen) = script_server(
        1,
        b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nonly this much",
    )
    .await;

    let client = Client::new();
    let err = client
        .raw(&url, "GET / HTTP/1.1\r\nHost: x\r\n\r\n")
        .await
        .unwrap_err();
    assert!(matches!(err, WireError::BodyRead { .. }));
}

#[tokio::test]
async fn test_empty_payload_still_reads_response() {
    // Nothing goes out, but whatever the peer volunteers still comes back
    // framed.
    let (url, seen) = script_server(0, b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\nhi!").await;

    let client = Client::new();
    let resp = client.raw(&url, "").await.unwrap();
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"hi!");
    assert!(seen.await.unwrap().is_empty());
}
