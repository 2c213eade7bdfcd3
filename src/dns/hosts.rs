//! Operator-supplied hostname overrides.

use super::Candidate;
use crate::base::neterror::NetError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::IpAddr;

/// Source label carried by candidates that come from the table.
pub const STATIC_SOURCE: &str = "static";

/// Hostname → ordered IP-literal list, consulted when every live DNS source
/// came back empty.
///
/// One mutex guards every read and write. Keys are matched exactly as
/// supplied (case-sensitive). A present key never maps to an empty list:
/// entries only grow by [`add`](Self::add) and disappear whole through
/// [`remove`](Self::remove).
#[derive(Debug, Default)]
pub struct StaticHostTable {
    entries: Mutex<HashMap<String, Vec<String>>>,
}

impl StaticHostTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `ip` to the list for `host`, creating the entry if needed.
    ///
    /// Duplicates are kept. Strings that are not IP literals are rejected
    /// and leave the table untouched.
    pub fn add(&self, host: impl Into<String>, ip: &str) -> Result<(), NetError> {
        let ip = ip.trim();
        if ip.parse::<IpAddr>().is_err() {
            return Err(NetError::InvalidAddress {
                input: ip.to_string(),
            });
        }

        let host = host.into();
        tracing::info!(host = %host, ip = %ip, "adding static host");
        self.entries
            .lock()
            .entry(host)
            .or_default()
            .push(ip.to_string());
        Ok(())
    }

    /// Drops every IP stored for `host`. Returns whether an entry existed.
    pub fn remove(&self, host: &str) -> bool {
        let removed = self.entries.lock().remove(host).is_some();
        tracing::info!(host = %host, removed, "removing static host");
        removed
    }

    /// Returns a copy of the list for `host`, in insertion order.
    pub fn lookup(&self, host: &str) -> Option<Vec<String>> {
        self.entries.lock().get(host).cloned()
    }

    /// Returns the entry for `host` as probe candidates, in table order.
    pub fn candidates(&self, host: &str) -> Vec<Candidate> {
        let entries = self.entries.lock();
        let Some(ips) = entries.get(host) else {
            return Vec::new();
        };
        ips.iter()
            .filter_map(|ip| ip.parse::<IpAddr>().ok())
            .map(|ip| Candidate::new(ip, STATIC_SOURCE))
            .collect()
    }

    /// Number of hosts with an override.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_add_appends_in_order() {
        let table = StaticHostTable::new();
        table.add("x.test", "10.0.0.1").unwrap();
        table.add("x.test", "10.0.0.2").unwrap();

        assert_eq!(
            table.lookup("x.test"),
            Some(vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()])
        );
    }

    #[test]
    fn test_add_keeps_duplicates() {
        let table = StaticHostTable::new();
        table.add("x.test", "10.0.0.1").unwrap();
        table.add("x.test", "10.0.0.1").unwrap();
        assert_eq!(table.lookup("x.test").unwrap().len(), 2);
    }

    #[test]
    fn test_remove_drops_whole_host() {
        let table = StaticHostTable::new();
        table.add("x.test", "10.0.0.1").unwrap();
        table.add("x.test", "10.0.0.2").unwrap();

        assert!(table.remove("x.test"));
        assert_eq!(table.lookup("x.test"), None);
        assert!(table.is_empty());
        assert!(!table.remove("x.test"));
    }

    #[test]
    fn test_invalid_ip_rejected() {
        let table = StaticHostTable::new();
        let err = table.add("x.test", "not-an-ip").unwrap_err();
        assert!(matches!(err, NetError::InvalidAddress { input } if input == "not-an-ip"));
        // No empty list left behind.
        assert_eq!(table.lookup("x.test"), None);
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let table = StaticHostTable::new();
        table.add("X.test", "10.0.0.1").unwrap();
        assert!(table.lookup("x.test").is_none());
        assert!(table.lookup("X.test").is_some());
    }

    #[test]
    fn test_candidates_in_table_order() {
        let table = StaticHostTable::new();
        table.add("x.test", "::1").unwrap();
        table.add("x.test", "10.0.0.1").unwrap();

        let candidates = table.candidates("x.test");
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].ip().is_ipv6());
        assert_eq!(candidates[1].ip().to_string(), "10.0.0.1");
        assert!(candidates.iter().all(|c| c.source() == STATIC_SOURCE));
        assert!(table.candidates("other.test").is_empty());
    }

    #[test]
    fn test_concurrent_adds() {
        let table = Arc::new(StaticHostTable::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let table = table.clone();
                std::thread::spawn(move || {
                    for j in 0..50 {
                        table.add("x.test", &format!("10.0.{}.{}", i, j)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(table.lookup("x.test").unwrap().len(), 400);
    }
}
