//! Request smuggling probe.
//!
//! Sends a request carrying both Content-Length and Transfer-Encoding,
//! the classic CL.TE ambiguity, and prints how the target frames its
//! answer. A conventional client would refuse to build this request;
//! the raw path ships it untouched.

use rawwire::Client;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let target = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://127.0.0.1:8080".to_string());
    let host = url::Url::parse(&target)?
        .host_str()
        .unwrap_or("localhost")
        .to_string();

    let probe = format!(
        "POST / HTTP/1.1\r\n\
         Host: {host}\r\n\
         Content-Length: 6\r\n\
         Transfer-Encoding: chunked\r\n\
         Connection: close\r\n\
         \r\n\
         0\r\n\
         \r\n\
         X"
    );

    println!("Probing {target} with a CL.TE request ({} bytes)", probe.len());

    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build();

    match client.raw(&target, probe).await {
        Ok(response) => {
            println!(
                "Status: {} {}",
                response.status(),
                response.reason().unwrap_or("")
            );
            for (name, value) in response.headers() {
                println!("  {}: {}", name, value.to_str().unwrap_or("<binary>"));
            }
            let body = response.bytes().await?;
            println!("Body ({} bytes):", body.len());
            println!("{}", String::from_utf8_lossy(&body));
        }
        Err(e) => eprintln!("Probe failed: {e}"),
    }

    Ok(())
}
