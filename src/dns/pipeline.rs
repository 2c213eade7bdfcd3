//! Resolution pipeline.
//!
//! [`HostResolver`] turns a hostname into one reachable address by walking
//! three tiers, each consulted only when the previous one produced nothing
//! reachable:
//!
//! 1. **Race**: all configured sources raced, winner's answer probed.
//! 2. **Static overrides**: operator-declared IPs for the host, probed in
//!    table order.
//! 3. **Platform sweep**: whatever getaddrinfo returns, probed in order.
//!
//! Per-source and per-candidate failures are absorbed; the only error that
//! leaves [`HostResolver::resolve`] is [`NetError::HostUnresolved`].

use super::{
    hosts::StaticHostTable, probe, Candidate, GaiResolver, HickorySource, Name, RaceEngine,
    Resolve, ResolutionConfig, ResolverEndpoint, Source,
};
use crate::base::neterror::NetError;
use std::{fmt, net::SocketAddr, sync::Arc};

/// Source label carried by candidates from the platform resolver.
pub const SYSTEM_SOURCE: &str = "system";

/// Which tier produced the resolved address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Literal,
    Race,
    Static,
    System,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::Literal => "literal",
            Tier::Race => "race",
            Tier::Static => "static",
            Tier::System => "system",
        })
    }
}

/// An owned resolution context.
///
/// Each context carries its own source set, static host table and in-flight
/// query budget; nothing is shared between contexts unless the caller shares
/// the table explicitly through [`HostResolver::with_static_hosts`].
///
/// # Example
///
/// ```rust,ignore
/// use wsresolve::dns::HostResolver;
///
/// let resolver = HostResolver::new()?;
/// resolver.add_static_host("api.example.com", "203.0.113.7")?;
/// let addr = resolver.resolve("api.example.com", 443).await?;
/// ```
pub struct HostResolver {
    sources: Vec<Arc<dyn Source>>,
    static_hosts: Arc<StaticHostTable>,
    system: Arc<dyn Resolve>,
    race: RaceEngine,
    config: ResolutionConfig,
}

impl HostResolver {
    /// Resolver over the six default endpoints with default settings.
    pub fn new() -> Result<Self, NetError> {
        Self::with_config(ResolutionConfig::default())
    }

    /// Resolver over the six default endpoints.
    pub fn with_config(config: ResolutionConfig) -> Result<Self, NetError> {
        let sources = HickorySource::for_endpoints(&ResolverEndpoint::defaults(), &config)?;
        Ok(Self::with_sources(sources, Arc::new(GaiResolver::new()), config))
    }

    /// Resolver over caller-supplied sources and platform resolver.
    pub fn with_sources(
        sources: Vec<Arc<dyn Source>>,
        system: Arc<dyn Resolve>,
        config: ResolutionConfig,
    ) -> Self {
        Self {
            sources,
            static_hosts: Arc::new(StaticHostTable::new()),
            system,
            race: RaceEngine::new(&config),
            config,
        }
    }

    /// Replaces the static host table, e.g. to share one across contexts.
    pub fn with_static_hosts(mut self, table: Arc<StaticHostTable>) -> Self {
        self.static_hosts = table;
        self
    }

    pub fn config(&self) -> &ResolutionConfig {
        &self.config
    }

    pub fn static_hosts(&self) -> &Arc<StaticHostTable> {
        &self.static_hosts
    }

    /// Appends `ip` to the overrides for `host`.
    pub fn add_static_host(&self, host: &str, ip: &str) -> Result<(), NetError> {
        self.static_hosts.add(host, ip)
    }

    /// Removes every override for `host`.
    pub fn remove_static_host(&self, host: &str) -> bool {
        self.static_hosts.remove(host)
    }

    /// Resolves `domain` to an address that accepted a TCP connection on
    /// `port`.
    pub async fn resolve(&self, domain: &str, port: u16) -> Result<SocketAddr, NetError> {
        self.resolve_with_tier(domain, port)
            .await
            .map(|(addr, _)| addr)
    }

    /// Like [`resolve`](Self::resolve), also reporting which tier answered.
    pub async fn resolve_with_tier(
        &self,
        domain: &str,
        port: u16,
    ) -> Result<(SocketAddr, Tier), NetError> {
        let name = Name::new(domain);
        let timeout = self.config.probe_timeout;

        if let Some(ip) = name.as_ip() {
            let literal = [Candidate::new(ip, "literal")];
            return match probe::probe(&literal, port, timeout).await {
                Some(addr) => Ok((addr, Tier::Literal)),
                None => Err(self.unresolved(&name)),
            };
        }

        let mut raced = self.race.race(&name, &self.sources).await;
        if self.config.interleave_families {
            raced = probe::interleave_families(raced);
        }
        tracing::debug!(domain = %name, count = raced.len(), "race tier finished");
        if let Some(addr) = probe::probe(&raced, port, timeout).await {
            tracing::info!(domain = %name, addr = %addr, tier = %Tier::Race, "host resolved");
            return Ok((addr, Tier::Race));
        }

        // The lock is held only while copying the entry out, never across a probe.
        let pinned = self.static_hosts.candidates(name.as_str());
        if !pinned.is_empty() {
            tracing::debug!(domain = %name, count = pinned.len(), "static host entry found");
            if let Some(addr) = probe::probe(&pinned, port, timeout).await {
                tracing::info!(domain = %name, addr = %addr, tier = %Tier::Static, "host resolved");
                return Ok((addr, Tier::Static));
            }
        }

        let swept = self.system_candidates(&name).await;
        if let Some(addr) = probe::probe(&swept, port, timeout).await {
            tracing::info!(domain = %name, addr = %addr, tier = %Tier::System, "host resolved");
            return Ok((addr, Tier::System));
        }

        Err(self.unresolved(&name))
    }

    async fn system_candidates(&self, name: &Name) -> Vec<Candidate> {
        match self.system.resolve(name.clone()).await {
            Ok(addrs) => addrs
                .map(|addr| Candidate::new(addr.ip(), SYSTEM_SOURCE))
                .collect(),
            Err(e) => {
                tracing::debug!(domain = %name, error = %e, "platform resolver failed");
                Vec::new()
            }
        }
    }

    fn unresolved(&self, name: &Name) -> NetError {
        tracing::warn!(domain = %name, "no reachable address in any tier");
        NetError::HostUnresolved {
            domain: name.to_string(),
        }
    }
}

impl fmt::Debug for HostResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostResolver")
            .field(
                "sources",
                &self.sources.iter().map(|s| s.label()).collect::<Vec<_>>(),
            )
            .field("static_hosts", &self.static_hosts.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
