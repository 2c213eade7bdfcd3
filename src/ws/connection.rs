//! WebSocket client over a resolver-vetted TCP stream.
//!
//! [`ConnectJob`] does the resolution and the TCP connect; tokio-tungstenite
//! only sees an already connected stream and runs TLS (for `wss://`), the
//! opening handshake and framing on it.

use crate::base::neterror::NetError;
use crate::dns::HostResolver;
use crate::socket::ConnectJob;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use http::header::{HeaderName, HeaderValue, SEC_WEBSOCKET_PROTOCOL};
use http::{HeaderMap, Request};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::{client_async_tls, tungstenite, MaybeTlsStream, WebSocketStream};
use url::Url;

pub use tokio_tungstenite::tungstenite::Message;

type Transport = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// An open WebSocket.
///
/// Reading and writing halves sit behind separate locks, so one task can
/// wait in [`recv`](Self::recv) while another sends.
pub struct WebSocket {
    writer: Arc<Mutex<SplitSink<Transport, Message>>>,
    reader: Arc<Mutex<SplitStream<Transport>>>,
    url: Url,
    protocol: Option<String>,
}

impl WebSocket {
    /// Opens `url` with no extra headers.
    ///
    /// # Example
    /// ```ignore
    /// let resolver = HostResolver::new()?;
    /// let ws = WebSocket::connect("wss://echo.websocket.org", &resolver).await?;
    /// ```
    pub async fn connect(url: &str, resolver: &HostResolver) -> Result<Self, NetError> {
        Self::builder(url)?.connect(resolver).await
    }

    /// Starts a builder for `url`. Only `ws://` and `wss://` are accepted.
    pub fn builder(url: &str) -> Result<WebSocketBuilder, NetError> {
        let url = Url::parse(url).map_err(|_| NetError::InvalidUrl)?;
        match url.scheme() {
            "ws" | "wss" => Ok(WebSocketBuilder {
                url,
                headers: HeaderMap::new(),
                protocols: Vec::new(),
            }),
            _ => Err(NetError::UnknownUrlScheme),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Subprotocol the server selected, if any.
    pub fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    pub async fn send(&self, msg: Message) -> Result<(), NetError> {
        self.writer.lock().await.send(msg).await.map_err(|e| {
            tracing::debug!(url = %self.url, error = %e, "websocket write failed");
            NetError::ConnectionClosed
        })
    }

    pub async fn send_text(&self, text: impl Into<String>) -> Result<(), NetError> {
        self.send(Message::Text(text.into())).await
    }

    pub async fn send_binary(&self, data: impl Into<Vec<u8>>) -> Result<(), NetError> {
        self.send(Message::Binary(data.into())).await
    }

    /// Next frame from the server; `Ok(None)` once the stream has ended.
    pub async fn recv(&self) -> Result<Option<Message>, NetError> {
        match self.reader.lock().await.next().await {
            None => Ok(None),
            Some(Ok(msg)) => Ok(Some(msg)),
            Some(Err(e)) => {
                tracing::debug!(url = %self.url, error = %e, "websocket read failed");
                Err(NetError::ConnectionClosed)
            }
        }
    }

    /// Sends a close frame with `code` and `reason`.
    pub async fn close(&self, code: u16, reason: impl Into<String>) -> Result<(), NetError> {
        let reason: String = reason.into();
        self.send(Message::Close(Some(CloseFrame {
            code: CloseCode::from(code),
            reason: reason.into(),
        })))
        .await
    }
}

/// Opening-handshake options for a [`WebSocket`].
#[derive(Debug, Clone)]
pub struct WebSocketBuilder {
    url: Url,
    headers: HeaderMap,
    protocols: Vec<String>,
}

impl WebSocketBuilder {
    /// Adds a handshake header. Names or values that are not valid HTTP
    /// are dropped.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::debug!(header = %name, "ignoring invalid handshake header"),
        }
        self
    }

    /// Offers a subprotocol; offers are sent in call order.
    pub fn subprotocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocols.push(protocol.into());
        self
    }

    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "wss"
    }

    fn handshake_request(&self) -> Result<Request<()>, NetError> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|_| NetError::InvalidUrl)?;
        let headers = request.headers_mut();
        headers.extend(self.headers.clone());
        if !self.protocols.is_empty() {
            let offer = HeaderValue::try_from(self.protocols.join(", "))
                .map_err(|_| NetError::WsProtocolError)?;
            headers.insert(SEC_WEBSOCKET_PROTOCOL, offer);
        }
        Ok(request)
    }

    /// Resolves the host, connects and performs the opening handshake.
    pub async fn connect(self, resolver: &HostResolver) -> Result<WebSocket, NetError> {
        let request = self.handshake_request()?;
        let stream = ConnectJob::connect(&self.url, resolver).await?;

        let (transport, response) = client_async_tls(request, stream)
            .await
            .map_err(handshake_error)?;
        let protocol = response
            .headers()
            .get(SEC_WEBSOCKET_PROTOCOL)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        tracing::info!(url = %self.url, protocol = ?protocol, "websocket open");

        let (writer, reader) = transport.split();
        Ok(WebSocket {
            writer: Arc::new(Mutex::new(writer)),
            reader: Arc::new(Mutex::new(reader)),
            url: self.url,
            protocol,
        })
    }
}

fn handshake_error(e: tungstenite::Error) -> NetError {
    tracing::debug!(error = %e, "websocket handshake failed");
    match e {
        tungstenite::Error::Io(_) => NetError::ConnectionFailed,
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            NetError::ConnectionClosed
        }
        tungstenite::Error::Url(_) => NetError::InvalidUrl,
        _ => NetError::WsProtocolError,
    }
}
