use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rawwire::Client;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

/// Loopback server answering every connection with a 1 KiB body and
/// closing, so both dispatch paths dial fresh each iteration.
fn spawn_server(rt: &Runtime) -> String {
    rt.block_on(async {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut sock, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = sock.read(&mut buf).await;
                    let body = vec![b'x'; 1024];
                    let head = format!(
                        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    );
                    let _ = sock.write_all(head.as_bytes()).await;
                    let _ = sock.write_all(&body).await;
                });
            }
        });
        format!("http://127.0.0.1:{}", addr.port())
    })
}

fn bench_raw_roundtrip(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let url = spawn_server(&rt);
    let client = Client::new();

    let mut group = c.benchmark_group("roundtrip");
    group.sample_size(30);

    group.bench_function("raw_loopback", |b| {
        b.to_async(&rt).iter(|| async {
            let resp = client
                .raw(&url, "GET / HTTP/1.1\r\nHost: bench\r\n\r\n")
                .await
                .unwrap();
            black_box(resp.bytes().await.unwrap())
        });
    });

    group.bench_function("delegate_loopback", |b| {
        b.to_async(&rt).iter(|| async {
            let resp = client.get(&url, ()).await.unwrap();
            black_box(resp.bytes().await.unwrap())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_raw_roundtrip);
criterion_main!(benches);
