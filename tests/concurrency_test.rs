//! Concurrent raw exchanges through one shared client.
//!
//! Covers:
//! - Exchange isolation: each gets its own connection and its own bytes
//! - A cloned client is safe to drive from many tasks

use rawwire::Client;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

#[tokio::test]
async fn test_parallel_exchanges_stay_isolated() {
    // One listener, many connections. Each response echoes a marker from
    // the request so cross-wiring would be visible.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut sock, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let n = sock.read(&mut buf).await.unwrap();
                let request = String::from_utf8_lossy(&buf[..n]).into_owned();
                // The request path is "/task-N".
                let marker = request
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("/missing")
                    .trim_start_matches('/')
                    .to_owned();
                let body = format!("echo:{marker}");
                let resp = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{}",
                    body.len(),
                    body
                );
                sock.write_all(resp.as_bytes()).await.unwrap();
            });
        }
    });

    let client = Client::new();
    let mut tasks = Vec::new();
    for i in 0..8 {
        let client = client.clone();
        let url = format!("http://127.0.0.1:{}/", addr.port());
        tasks.push(tokio::spawn(async move {
            let payload = format!("GET /task-{i} HTTP/1.1\r\nHost: x\r\n\r\n");
            let resp = client.raw(&url, payload).await.unwrap();
            (i, resp.bytes().await.unwrap())
        }));
    }

    for task in tasks {
        let (i, body) = task.await.unwrap();
        assert_eq!(body.as_ref(), format!("echo:task-{i}").as_bytes());
    }
}

#[tokio::test]
async fn test_exchange_failure_does_not_poison_the_client() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        // First connection: slam the door. Second: answer properly.
        let (sock, _) = listener.accept().await.unwrap();
        drop(sock);
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = sock.read(&mut buf).await;
        sock.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok")
            .await
            .unwrap();
    });

    let client = Client::new();
    let url = format!("http://127.0.0.1:{}/", addr.port());
    let payload = "GET / HTTP/1.1\r\nHost: x\r\n\r\n";

    client.raw(&url, payload).await.unwrap_err();
    let resp = client.raw(&url, payload).await.unwrap();
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"ok");
}
