//! Single-source DNS queries backed by hickory-dns.
//!
//! Each [`HickorySource`] owns a resolver pinned to exactly one
//! [`ResolverEndpoint`], so every racing source talks to one operator over
//! one transport (DoH or plain UDP).

use super::{Candidate, Name, Querying, ResolutionConfig, ResolverEndpoint, Source};
use crate::base::neterror::NetError;
use hickory_resolver::{
    config::{NameServerConfig, ResolveHosts, ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
    proto::{
        rr::{RData, RecordType},
        xfer::Protocol,
    },
    Resolver, TokioResolver,
};
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};
use url::{Host, Url};

const DNS_PORT: u16 = 53;

/// A racing [`Source`] that asks one endpoint for A records.
#[derive(Clone)]
pub struct HickorySource {
    label: Arc<str>,
    resolver: TokioResolver,
}

impl HickorySource {
    /// Builds a resolver bound to `endpoint`.
    ///
    /// Fails only when a DoH URL cannot be turned into a server address.
    pub fn new(endpoint: &ResolverEndpoint, config: &ResolutionConfig) -> Result<Self, NetError> {
        let mut resolver_config = ResolverConfig::new();
        for name_server in name_servers(endpoint)? {
            resolver_config.add_name_server(name_server);
        }

        let mut opts = ResolverOpts::default();
        opts.timeout = config.query_timeout;
        opts.attempts = 1;
        opts.use_hosts_file = ResolveHosts::Never;

        let resolver =
            Resolver::builder_with_config(resolver_config, TokioConnectionProvider::default())
                .with_options(opts)
                .build();

        Ok(Self {
            label: endpoint.to_string().into(),
            resolver,
        })
    }

    /// Builds one source per endpoint.
    pub fn for_endpoints(
        endpoints: &[ResolverEndpoint],
        config: &ResolutionConfig,
    ) -> Result<Vec<Arc<dyn Source>>, NetError> {
        endpoints
            .iter()
            .map(|endpoint| Self::new(endpoint, config).map(|s| Arc::new(s) as Arc<dyn Source>))
            .collect()
    }
}

impl Source for HickorySource {
    fn label(&self) -> &str {
        &self.label
    }

    fn query(&self, name: Name) -> Querying {
        let resolver = self.resolver.clone();
        let label = self.label.clone();
        Box::pin(async move {
            let domain = name.as_str();
            tracing::debug!(domain = %domain, endpoint = %label, "querying source");

            let lookup = match resolver.lookup(domain, RecordType::A).await {
                Ok(lookup) => lookup,
                Err(e) => {
                    tracing::debug!(domain = %domain, endpoint = %label, error = %e, "source query failed");
                    return Vec::new();
                }
            };

            let candidates: Vec<Candidate> = lookup
                .iter()
                .filter_map(answer_ip)
                .map(|ip| Candidate::new(ip, label.clone()))
                .collect();

            tracing::debug!(
                domain = %domain,
                endpoint = %label,
                count = candidates.len(),
                "source query complete"
            );
            candidates
        })
    }
}

/// Keeps address answers only; CNAMEs and anything else are dropped.
fn answer_ip(rdata: &RData) -> Option<IpAddr> {
    match rdata {
        RData::A(a) => Some(IpAddr::V4(a.0)),
        RData::AAAA(aaaa) => Some(IpAddr::V6(aaaa.0)),
        _ => None,
    }
}

fn name_servers(endpoint: &ResolverEndpoint) -> Result<Vec<NameServerConfig>, NetError> {
    match endpoint {
        ResolverEndpoint::Plain { server_address } => {
            let addr = SocketAddr::new(*server_address, DNS_PORT);
            Ok(vec![
                NameServerConfig::new(addr, Protocol::Udp),
                NameServerConfig::new(addr, Protocol::Tcp),
            ])
        }
        ResolverEndpoint::Doh { url, bootstrap } => {
            let url = Url::parse(url).map_err(|_| NetError::InvalidUrl)?;
            if url.scheme() != "https" {
                return Err(NetError::UnknownUrlScheme);
            }
            let port = url.port_or_known_default().ok_or(NetError::InvalidUrl)?;

            let (ips, server_name) = match url.host().ok_or(NetError::InvalidUrl)? {
                Host::Ipv4(ip) => (vec![IpAddr::V4(ip)], ip.to_string()),
                Host::Ipv6(ip) => (vec![IpAddr::V6(ip)], ip.to_string()),
                Host::Domain(domain) => (bootstrap.to_vec(), domain.to_string()),
            };
            if ips.is_empty() {
                return Err(NetError::InvalidUrl);
            }

            Ok(ips
                .into_iter()
                .map(|ip| {
                    let mut ns = NameServerConfig::new(SocketAddr::new(ip, port), Protocol::Https);
                    ns.tls_dns_name = Some(server_name.clone());
                    ns.http_endpoint = Some(url.path().to_string());
                    ns
                })
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_resolver::proto::rr::rdata::{A, AAAA, CNAME};
    use hickory_resolver::proto::rr::Name as DnsName;
    use std::borrow::Cow;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_plain_endpoint_uses_port_53() {
        let endpoint = ResolverEndpoint::Plain {
            server_address: IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
        };
        let servers = name_servers(&endpoint).unwrap();
        assert_eq!(servers.len(), 2);
        assert!(servers.iter().all(|s| s.socket_addr.port() == 53));
        assert_eq!(servers[0].protocol, Protocol::Udp);
    }

    #[test]
    fn test_doh_literal_host() {
        let endpoint = ResolverEndpoint::Doh {
            url: Cow::Borrowed("https://1.1.1.1/dns-query"),
            bootstrap: Cow::Borrowed(&[]),
        };
        let servers = name_servers(&endpoint).unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].socket_addr, "1.1.1.1:443".parse::<SocketAddr>().unwrap());
        assert_eq!(servers[0].protocol, Protocol::Https);
        assert_eq!(servers[0].tls_dns_name.as_deref(), Some("1.1.1.1"));
        assert_eq!(servers[0].http_endpoint.as_deref(), Some("/dns-query"));
    }

    #[test]
    fn test_doh_named_host_uses_bootstrap() {
        let endpoints = ResolverEndpoint::defaults();
        let servers = name_servers(&endpoints[1]).unwrap();
        assert_eq!(servers.len(), 2);
        assert!(servers
            .iter()
            .all(|s| s.tls_dns_name.as_deref() == Some("dns.google")));
    }

    #[test]
    fn test_doh_named_host_without_bootstrap_is_rejected() {
        let endpoint = ResolverEndpoint::Doh {
            url: Cow::Borrowed("https://doh.example/dns-query"),
            bootstrap: Cow::Borrowed(&[]),
        };
        assert!(matches!(name_servers(&endpoint), Err(NetError::InvalidUrl)));
    }

    #[test]
    fn test_doh_requires_https() {
        let endpoint = ResolverEndpoint::Doh {
            url: Cow::Borrowed("http://1.1.1.1/dns-query"),
            bootstrap: Cow::Borrowed(&[]),
        };
        assert!(matches!(
            name_servers(&endpoint),
            Err(NetError::UnknownUrlScheme)
        ));
    }

    #[test]
    fn test_answer_filter_keeps_addresses_only() {
        let v4 = RData::A(A(Ipv4Addr::new(10, 0, 0, 1)));
        let v6 = RData::AAAA(AAAA(Ipv6Addr::LOCALHOST));
        let alias = RData::CNAME(CNAME(DnsName::from_ascii("alias.example.").unwrap()));

        assert_eq!(answer_ip(&v4), Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))));
        assert_eq!(answer_ip(&v6), Some(IpAddr::V6(Ipv6Addr::LOCALHOST)));
        assert_eq!(answer_ip(&alias), None);
    }

    #[tokio::test]
    async fn test_unreachable_server_yields_empty() {
        // TEST-NET-1 is never routed, so the query can only time out.
        let endpoint = ResolverEndpoint::Plain {
            server_address: IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)),
        };
        let config =
            ResolutionConfig::new().query_timeout(std::time::Duration::from_millis(200));
        let source = HickorySource::new(&endpoint, &config).unwrap();
        assert_eq!(source.label(), "udp://192.0.2.1:53");

        let candidates = source.query(Name::new("example.com")).await;
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_default_sources_build() {
        let config = ResolutionConfig::default();
        let sources = HickorySource::for_endpoints(&ResolverEndpoint::defaults(), &config).unwrap();
        assert_eq!(sources.len(), 6);
    }
}
