//! The fixed set of DNS sources raced by the resolver.

use std::borrow::Cow;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

/// A DNS service that can be asked for address records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverEndpoint {
    /// DNS-over-HTTPS service.
    ///
    /// `bootstrap` holds fixed addresses for a URL whose host is a name, so
    /// that reaching the service never depends on DNS. It is empty when the
    /// URL host is already an IP literal.
    Doh {
        url: Cow<'static, str>,
        bootstrap: Cow<'static, [IpAddr]>,
    },
    /// Classic UDP resolver on port 53.
    Plain { server_address: IpAddr },
}

const GOOGLE_DOH_BOOTSTRAP: &[IpAddr] = &[
    IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
    IpAddr::V4(Ipv4Addr::new(8, 8, 4, 4)),
];

const ADGUARD_DOH_BOOTSTRAP: &[IpAddr] = &[
    IpAddr::V4(Ipv4Addr::new(94, 140, 14, 140)),
    IpAddr::V4(Ipv4Addr::new(94, 140, 14, 141)),
];

impl ResolverEndpoint {
    /// The canonical six sources: three DoH services and three plain
    /// resolvers, spread over Cloudflare, Google and AdGuard.
    pub fn defaults() -> Vec<ResolverEndpoint> {
        vec![
            ResolverEndpoint::Doh {
                url: Cow::Borrowed("https://1.1.1.1/dns-query"),
                bootstrap: Cow::Borrowed(&[]),
            },
            ResolverEndpoint::Doh {
                url: Cow::Borrowed("https://dns.google/dns-query"),
                bootstrap: Cow::Borrowed(GOOGLE_DOH_BOOTSTRAP),
            },
            ResolverEndpoint::Doh {
                url: Cow::Borrowed("https://unfiltered.adguard-dns.com/dns-query"),
                bootstrap: Cow::Borrowed(ADGUARD_DOH_BOOTSTRAP),
            },
            ResolverEndpoint::Plain {
                server_address: IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
            },
            ResolverEndpoint::Plain {
                server_address: IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
            },
            ResolverEndpoint::Plain {
                server_address: IpAddr::V4(Ipv4Addr::new(94, 140, 14, 140)),
            },
        ]
    }

    pub fn is_doh(&self) -> bool {
        matches!(self, ResolverEndpoint::Doh { .. })
    }
}

impl fmt::Display for ResolverEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverEndpoint::Doh { url, .. } => write!(f, "doh+{}", url),
            ResolverEndpoint::Plain { server_address } => {
                write!(f, "udp://{}", std::net::SocketAddr::new(*server_address, 53))
            }
        }
    }
}
