//! Core DNS resolution types and traits.
//!
//! Two seams live here:
//! - [`Source`]: one racing DNS source. Never fails; a broken source simply
//!   yields no candidates.
//! - [`Resolve`]: the platform resolver used by the final sweep tier.

use crate::base::neterror::NetError;
use std::{
    fmt,
    future::Future,
    net::{IpAddr, SocketAddr},
    pin::Pin,
    sync::Arc,
};

/// A domain name to resolve into IP addresses.
///
/// Lightweight wrapper around a hostname string. Comparison is
/// case-sensitive, matching how static host overrides are keyed.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct Name {
    host: Arc<str>,
}

impl Name {
    /// Creates a new [`Name`] from any string-like type.
    #[inline]
    pub fn new(host: impl Into<Arc<str>>) -> Self {
        Self { host: host.into() }
    }

    /// View the hostname as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.host
    }

    /// Returns the address if the name is already an IP literal.
    pub fn as_ip(&self) -> Option<IpAddr> {
        self.host.parse().ok()
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::new(value)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.host, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.host, f)
    }
}

/// An address produced by one resolution source, tagged with that source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    ip: IpAddr,
    source: Arc<str>,
}

impl Candidate {
    pub fn new(ip: IpAddr, source: impl Into<Arc<str>>) -> Self {
        Self {
            ip,
            source: source.into(),
        }
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    /// Label of the source that produced this candidate.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn socket_addr(&self, port: u16) -> SocketAddr {
        SocketAddr::new(self.ip, port)
    }
}

/// Alias for the `Future` returned by a racing [`Source`].
pub type Querying = Pin<Box<dyn Future<Output = Vec<Candidate>> + Send>>;

/// One independent DNS source taking part in the race.
///
/// Implementations must absorb their own failures: transport errors, parse
/// errors and "no records" all look the same to the race engine, an empty
/// list.
pub trait Source: Send + Sync {
    /// Short label used in logs and on produced candidates.
    fn label(&self) -> &str;

    /// Asks this source for the addresses of `name`.
    fn query(&self, name: Name) -> Querying;
}

impl<S: Source + ?Sized> Source for Arc<S> {
    fn label(&self) -> &str {
        (**self).label()
    }

    fn query(&self, name: Name) -> Querying {
        (**self).query(name)
    }
}

/// Alias for an `Iterator` trait object over `SocketAddr`.
pub type Addrs = Box<dyn Iterator<Item = SocketAddr> + Send>;

/// Alias for the `Future` type returned by a platform resolver.
pub type Resolving = Pin<Box<dyn Future<Output = Result<Addrs, NetError>> + Send>>;

/// Trait for the platform (operating system) resolver.
///
/// The returned addresses have port 0; callers attach the target port.
pub trait Resolve: Send + Sync {
    /// Resolves a domain name to IP addresses.
    fn resolve(&self, name: Name) -> Resolving;
}

/// Blanket implementation for Arc-wrapped resolvers.
impl<R: Resolve + ?Sized> Resolve for Arc<R> {
    fn resolve(&self, name: Name) -> Resolving {
        (**self).resolve(name)
    }
}
