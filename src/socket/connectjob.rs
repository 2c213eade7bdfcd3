use crate::base::context::TimeoutResultExt;
use crate::base::neterror::NetError;
use crate::dns::HostResolver;
use std::net::SocketAddr;
use tokio::net::TcpStream;
use url::{Host, Url};

/// Manages the connection process: resolve -> TCP.
/// Roughly equivalent to net::ConnectJob, minus TLS, which the WebSocket
/// layer negotiates on top of the returned stream.
pub struct ConnectJob;

impl ConnectJob {
    /// Resolves the URL's host exactly once, then opens a TCP connection to
    /// the address the resolver vouched for.
    pub async fn connect(url: &Url, resolver: &HostResolver) -> Result<TcpStream, NetError> {
        let (host, port) = Self::host_and_port(url)?;

        // 1. Resolution (race -> static -> platform, reachability checked)
        let addr = resolver.resolve(&host, port).await?;

        // 2. TCP Connect
        Self::connect_addr(&host, addr, resolver).await
    }

    async fn connect_addr(
        host: &str,
        addr: SocketAddr,
        resolver: &HostResolver,
    ) -> Result<TcpStream, NetError> {
        let timeout = resolver.config().connect_timeout;
        let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .connect_context(host, addr.port())?;
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(addr = %addr, error = %e, "failed to set TCP_NODELAY");
        }
        tracing::debug!(host = %host, addr = %addr, "transport connected");
        Ok(stream)
    }

    /// Extracts the host to resolve and the port to probe.
    ///
    /// IPv6 literals are returned without brackets. The port falls back to
    /// the scheme default (80 for ws/http, 443 for wss/https).
    pub fn host_and_port(url: &Url) -> Result<(String, u16), NetError> {
        let host = match url.host().ok_or(NetError::InvalidUrl)? {
            Host::Domain(domain) => domain.to_string(),
            Host::Ipv4(ip) => ip.to_string(),
            Host::Ipv6(ip) => ip.to_string(),
        };
        let port = url.port_or_known_default().ok_or(NetError::UnknownUrlScheme)?;
        Ok((host, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(url: &str) -> (String, u16) {
        ConnectJob::host_and_port(&Url::parse(url).unwrap()).unwrap()
    }

    #[test]
    fn test_default_ports() {
        assert_eq!(parse("ws://example.com/chat"), ("example.com".into(), 80));
        assert_eq!(parse("wss://example.com/chat"), ("example.com".into(), 443));
        assert_eq!(parse("https://example.com"), ("example.com".into(), 443));
    }

    #[test]
    fn test_explicit_port() {
        assert_eq!(parse("wss://example.com:8443/"), ("example.com".into(), 8443));
    }

    #[test]
    fn test_ipv6_literal_unbracketed() {
        assert_eq!(parse("ws://[::1]:9000/"), ("::1".into(), 9000));
    }

    #[test]
    fn test_unknown_scheme_without_port() {
        let url = Url::parse("foo://example.com/").unwrap();
        assert!(matches!(
            ConnectJob::host_and_port(&url),
            Err(NetError::UnknownUrlScheme)
        ));
    }
}
