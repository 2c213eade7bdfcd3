//! Platform resolver for the last-resort sweep.
//!
//! `getaddrinfo` blocks, so every lookup runs on tokio's blocking pool.

use super::{Addrs, Name, Resolve, Resolving};
use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

/// Whatever the operating system would answer for a name, in the order it
/// answers. Honors `/etc/hosts`, search domains and the like.
#[derive(Clone, Debug, Default)]
pub struct GaiResolver;

impl GaiResolver {
    pub fn new() -> Self {
        Self
    }
}

fn getaddrinfo(host: &str) -> io::Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = (host, 0u16).to_socket_addrs()?.collect();
    if addrs.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            "getaddrinfo returned no addresses",
        ));
    }
    Ok(addrs)
}

impl Resolve for GaiResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(async move {
            let host = name.clone();
            let looked_up = tokio::task::spawn_blocking(move || getaddrinfo(host.as_str()))
                .await
                .map_err(|e| {
                    tracing::warn!(domain = %name, error = %e, "getaddrinfo task did not complete");
                    NetError::NameNotResolved
                })?;

            let addrs = looked_up.lookup_context(name.as_str())?;
            tracing::debug!(domain = %name, count = addrs.len(), "platform lookup complete");
            Ok(Box::new(addrs.into_iter()) as Addrs)
        })
    }
}
