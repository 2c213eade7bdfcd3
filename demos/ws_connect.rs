use tracing_subscriber::EnvFilter;
use wsresolve::dns::HostResolver;
use wsresolve::ws::{Message, WebSocket};

/// Opens a WebSocket through the resilient resolver, sends one message and
/// prints the reply.
///
/// Usage: cargo run --example ws_connect -- [wss://url]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wsresolve=info")),
        )
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "wss://echo.websocket.org".to_string());

    let resolver = HostResolver::new()?;
    let ws = WebSocket::builder(&url)?
        .header("User-Agent", "wsresolve-demo")
        .connect(&resolver)
        .await?;

    ws.send_text("ping from wsresolve").await?;
    // Some echo servers greet first; print until our message comes back.
    while let Some(msg) = ws.recv().await? {
        match msg {
            Message::Text(text) => {
                println!("< {}", text);
                if text == "ping from wsresolve" {
                    break;
                }
            }
            Message::Close(frame) => {
                println!("closed: {:?}", frame);
                return Ok(());
            }
            other => println!("< {:?}", other),
        }
    }

    ws.close(1000, "bye").await?;
    Ok(())
}
