//! WebSocket client support.
//!
//! A thin layer over tokio-tungstenite whose only job is to route connection
//! setup through [`HostResolver`](crate::dns::HostResolver).
//!
//! # Example
//! ```ignore
//! use wsresolve::dns::HostResolver;
//! use wsresolve::ws::{Message, WebSocket};
//!
//! let resolver = HostResolver::new()?;
//! let ws = WebSocket::connect("wss://echo.websocket.org", &resolver).await?;
//! ws.send(Message::Text("Hello".into())).await?;
//! let msg = ws.recv().await?;
//! ```

mod connection;

pub use connection::{Message, WebSocket, WebSocketBuilder};
