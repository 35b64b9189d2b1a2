use rawwire::Client;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // 1. Build a client
    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .build();

    // 2. Hand-write the request bytes
    let url = "https://example.com";
    let payload = "GET / HTTP/1.1\r\nHost: example.com\r\nConnection: close\r\n\r\n";
    println!("Sending {} bytes to {}", payload.len(), url);

    // 3. The RAW exchange: bytes go out exactly as written above
    let response = client.raw(url, payload).await?;

    // 4. Inspect the framed response
    println!(
        "Status: {} {}",
        response.status(),
        response.reason().unwrap_or("")
    );
    println!("Headers: {:#?}", response.headers());

    let body = response.bytes().await?;
    println!("Body: {} bytes (buffered, connection already closed)", body.len());

    Ok(())
}
