//! Resolution configuration.

use std::time::Duration;

/// How the race engine waits for the first useful answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RaceStrategy {
    /// Return as soon as the first task completes with candidates.
    #[default]
    FirstCompleted,
    /// Inspect a shared result slot every `interval` until it is filled or
    /// every task has finished.
    Polling { interval: Duration },
}

impl RaceStrategy {
    /// Polling at the classic 100 ms cadence.
    pub fn polling() -> Self {
        RaceStrategy::Polling {
            interval: Duration::from_millis(100),
        }
    }
}

/// Configuration for [`HostResolver`](super::HostResolver).
#[derive(Debug, Clone)]
pub struct ResolutionConfig {
    /// Upper bound for a single source query, including transport timeouts
    pub query_timeout: Duration,
    /// TCP connect bound for each reachability probe
    pub probe_timeout: Duration,
    /// Race execution strategy
    pub race_strategy: RaceStrategy,
    /// Cap on source queries outstanding at once, losers included
    pub max_in_flight_queries: usize,
    /// Alternate IPv6/IPv4 in race results before probing
    pub interleave_families: bool,
    /// TCP connect bound used by the connection-setup job
    pub connect_timeout: Duration,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(3),
            probe_timeout: Duration::from_millis(1000),
            race_strategy: RaceStrategy::FirstCompleted,
            max_in_flight_queries: 64,
            interleave_families: false,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl ResolutionConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-source query timeout.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Set the reachability probe timeout.
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set the race strategy.
    pub fn race_strategy(mut self, strategy: RaceStrategy) -> Self {
        self.race_strategy = strategy;
        self
    }

    /// Set the in-flight query cap. Zero is treated as one.
    pub fn max_in_flight_queries(mut self, max: usize) -> Self {
        self.max_in_flight_queries = max.max(1);
        self
    }

    /// Enable or disable IPv6/IPv4 interleaving of race results.
    pub fn interleave_families(mut self, enable: bool) -> Self {
        self.interleave_families = enable;
        self
    }

    /// Set the transport connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}
