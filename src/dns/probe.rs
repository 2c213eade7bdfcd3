//! Reachability probing.
//!
//! A DNS answer says nothing about liveness (stale records, split-horizon
//! views, blocked ports), so no address leaves the pipeline until a TCP
//! connection to it has actually been established.

use super::Candidate;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;

/// Tries `candidates` strictly in order and returns the first address that
/// accepts a TCP connection on `port` within `timeout`.
///
/// Probe connections are dropped as soon as the outcome is known.
pub async fn probe(candidates: &[Candidate], port: u16, timeout: Duration) -> Option<SocketAddr> {
    for candidate in candidates {
        let addr = candidate.socket_addr(port);
        match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                tracing::debug!(addr = %addr, source = %candidate.source(), "candidate reachable");
                return Some(addr);
            }
            Ok(Err(e)) => {
                tracing::debug!(addr = %addr, source = %candidate.source(), error = %e, "candidate unreachable");
            }
            Err(_) => {
                tracing::debug!(addr = %addr, source = %candidate.source(), ?timeout, "candidate probe timed out");
            }
        }
    }
    None
}

/// Reorders candidates so address families alternate, IPv6 first, the way
/// RFC 8305 orders connection attempts. Relative order within a family is
/// preserved and leftovers of the longer family go last.
pub fn interleave_families(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let (v6, v4): (Vec<_>, Vec<_>) = candidates.into_iter().partition(|c| c.ip().is_ipv6());
    let mut v6 = v6.into_iter();
    let mut v4 = v4.into_iter();
    let mut ordered = Vec::with_capacity(v6.len() + v4.len());
    loop {
        match (v6.next(), v4.next()) {
            (None, None) => break,
            (a, b) => ordered.extend(a.into_iter().chain(b)),
        }
    }
    ordered
}
