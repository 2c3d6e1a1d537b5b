//! Minimal interactive client for manual play-testing.
//!
//! Connects to a running server, prints every server line, and forwards
//! stdin lines as protocol input (first your name, then pit numbers).

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:3000".to_string());

    let stream = TcpStream::connect(&address).await?;
    println!("Connected to {}", address);
    let (read_half, mut write_half) = stream.into_split();

    // Print every server line as it arrives.
    let printer = tokio::spawn(async move {
        let mut lines = BufReader::new(read_half).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            println!("{}", line);
        }
        println!("Server closed the connection");
    });

    // Forward stdin to the server until either side goes away.
    let forward = async {
        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = stdin.next_line().await {
            if write_half.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if write_half.write_all(b"\n").await.is_err() {
                break;
            }
        }
    };

    tokio::select! {
        _ = printer => {},
        _ = forward => {},
    }

    Ok(())
}
