//! Resolution race engine.
//!
//! Every source is queried on its own spawned task and the first non-empty
//! answer wins. Completion order is the only tie-break, so which source wins
//! is not deterministic.
//!
//! Losing tasks are detached, not aborted: they run to completion in the
//! background and their answers are discarded. Two limits keep that from
//! growing without bound:
//! - every query is wrapped in the configured query timeout;
//! - an owned semaphore caps queries outstanding at once across all races
//!   of one resolver. A source that cannot get a permit sits the race out.
//!   Each race starts handing out permits one source further along the
//!   list, so under pressure the skipped sources rotate.

use super::{Candidate, Name, RaceStrategy, ResolutionConfig, Source};
use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Runs one race per call over a set of sources.
#[derive(Debug, Clone)]
pub struct RaceEngine {
    strategy: RaceStrategy,
    query_timeout: Duration,
    max_in_flight: usize,
    in_flight: Arc<Semaphore>,
    next_start: Arc<AtomicUsize>,
}

/// Counts a polling task as finished when dropped, so a panicking source
/// still releases the race.
struct FinishedGuard(Arc<AtomicUsize>);

impl Drop for FinishedGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }
}

impl RaceEngine {
    pub fn new(config: &ResolutionConfig) -> Self {
        let max_in_flight = config.max_in_flight_queries.max(1);
        Self {
            strategy: config.race_strategy,
            query_timeout: config.query_timeout,
            max_in_flight,
            in_flight: Arc::new(Semaphore::new(max_in_flight)),
            next_start: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queries currently holding a permit, losers of earlier races included.
    pub fn in_flight(&self) -> usize {
        self.max_in_flight - self.in_flight.available_permits()
    }

    /// Returns the first non-empty candidate list, or an empty list once
    /// every source has finished without one.
    pub async fn race(&self, name: &Name, sources: &[Arc<dyn Source>]) -> Vec<Candidate> {
        if sources.is_empty() {
            return Vec::new();
        }
        let start = self.next_start.fetch_add(1, Ordering::Relaxed) % sources.len();
        let (head, tail) = sources.split_at(start);
        let ordered: Vec<&Arc<dyn Source>> = tail.iter().chain(head).collect();
        match self.strategy {
            RaceStrategy::FirstCompleted => self.first_completed(name, &ordered).await,
            RaceStrategy::Polling { interval } => self.polling(name, &ordered, interval).await,
        }
    }

    /// Builds the bounded query future for one source, or `None` when the
    /// in-flight cap is exhausted.
    fn bounded_query(
        &self,
        name: &Name,
        source: &Arc<dyn Source>,
    ) -> Option<impl Future<Output = Vec<Candidate>> + Send + 'static> {
        let permit = match self.in_flight.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                tracing::warn!(
                    domain = %name,
                    endpoint = %source.label(),
                    "too many outstanding DNS queries, skipping source"
                );
                return None;
            }
        };

        let query = source.query(name.clone());
        let label: Arc<str> = source.label().into();
        let domain = name.clone();
        let timeout = self.query_timeout;
        Some(async move {
            let _permit = permit;
            match tokio::time::timeout(timeout, query).await {
                Ok(candidates) => candidates,
                Err(_) => {
                    tracing::debug!(domain = %domain, endpoint = %label, ?timeout, "source query timed out");
                    Vec::new()
                }
            }
        })
    }

    async fn first_completed(&self, name: &Name, sources: &[&Arc<dyn Source>]) -> Vec<Candidate> {
        let mut pending: FuturesUnordered<_> = sources
            .iter()
            .filter_map(|source| self.bounded_query(name, source))
            .map(tokio::spawn)
            .collect();

        // Dropping the remaining join handles detaches the losers.
        while let Some(joined) = pending.next().await {
            match joined {
                Ok(candidates) if !candidates.is_empty() => {
                    tracing::debug!(domain = %name, winner = %candidates[0].source(), "race won");
                    return candidates;
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(domain = %name, error = %e, "race task failed"),
            }
        }
        Vec::new()
    }

    async fn polling(
        &self,
        name: &Name,
        sources: &[&Arc<dyn Source>],
        interval: Duration,
    ) -> Vec<Candidate> {
        let slot: Arc<Mutex<Option<Vec<Candidate>>>> = Arc::new(Mutex::new(None));
        let finished = Arc::new(AtomicUsize::new(0));
        let mut launched = 0;

        for source in sources {
            let Some(query) = self.bounded_query(name, source) else {
                continue;
            };
            launched += 1;
            let slot = slot.clone();
            let finished = FinishedGuard(finished.clone());
            tokio::spawn(async move {
                // Dropped after the slot write, or during unwind on panic,
                // so "all finished" implies the slot is final.
                let _finished = finished;
                let candidates = query.await;
                if !candidates.is_empty() {
                    let mut slot = slot.lock();
                    if slot.is_none() {
                        *slot = Some(candidates);
                    }
                }
            });
        }

        loop {
            let all_done = finished.load(Ordering::Acquire) >= launched;
            if let Some(candidates) = slot.lock().take() {
                tracing::debug!(domain = %name, winner = %candidates[0].source(), "race won");
                return candidates;
            }
            if all_done {
                return Vec::new();
            }
            tokio::time::sleep(interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::Querying;
    use std::net::{IpAddr, Ipv4Addr};

    struct FakeSource {
        label: &'static str,
        delay: Duration,
        ips: Vec<IpAddr>,
    }

    impl FakeSource {
        fn new(label: &'static str, delay_ms: u64, ips: &[[u8; 4]]) -> Arc<dyn Source> {
            Arc::new(Self {
                label,
                delay: Duration::from_millis(delay_ms),
                ips: ips.iter().map(|o| IpAddr::V4(Ipv4Addr::from(*o))).collect(),
            })
        }
    }

    impl Source for FakeSource {
        fn label(&self) -> &str {
            self.label
        }

        fn query(&self, _name: Name) -> Querying {
            let delay = self.delay;
            let label = self.label;
            let ips = self.ips.clone();
            Box::pin(async move {
                tokio::time::sleep(delay).await;
                ips.into_iter().map(|ip| Candidate::new(ip, label)).collect()
            })
        }
    }

    struct HangingSource;

    impl Source for HangingSource {
        fn label(&self) -> &str {
            "hanging"
        }

        fn query(&self, _name: Name) -> Querying {
            Box::pin(std::future::pending())
        }
    }

    struct PanickingSource;

    impl Source for PanickingSource {
        fn label(&self) -> &str {
            "panicking"
        }

        fn query(&self, _name: Name) -> Querying {
            Box::pin(async { panic!("source blew up") })
        }
    }

    fn engine(strategy: RaceStrategy) -> RaceEngine {
        RaceEngine::new(
            &ResolutionConfig::new()
                .race_strategy(strategy)
                .query_timeout(Duration::from_millis(500)),
        )
    }

    #[tokio::test]
    async fn test_empty_source_list() {
        let engine = engine(RaceStrategy::FirstCompleted);
        assert!(engine.race(&Name::new("x.test"), &[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_answers_do_not_win() {
        let sources = vec![
            FakeSource::new("empty", 1, &[]),
            FakeSource::new("full", 50, &[[10, 0, 0, 1]]),
        ];
        let result = engine(RaceStrategy::FirstCompleted)
            .race(&Name::new("x.test"), &sources)
            .await;
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].source(), "full");
    }

    #[tokio::test]
    async fn test_polling_all_empty() {
        let sources = vec![FakeSource::new("a", 1, &[]), FakeSource::new("b", 5, &[])];
        let result = engine(RaceStrategy::Polling {
            interval: Duration::from_millis(5),
        })
        .race(&Name::new("x.test"), &sources)
        .await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_hanging_source_bounded_by_timeout() {
        let sources: Vec<Arc<dyn Source>> = vec![Arc::new(HangingSource)];
        let engine = RaceEngine::new(
            &ResolutionConfig::new().query_timeout(Duration::from_millis(50)),
        );
        let start = std::time::Instant::now();
        assert!(engine.race(&Name::new("x.test"), &sources).await.is_empty());
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_in_flight_cap_skips_sources() {
        let engine = RaceEngine::new(
            &ResolutionConfig::new()
                .query_timeout(Duration::from_secs(5))
                .max_in_flight_queries(1),
        );
        let sources = vec![
            FakeSource::new("fast", 10, &[[10, 0, 0, 1]]),
            FakeSource::new("skipped", 0, &[[10, 0, 0, 2]]),
        ];
        let result = engine.race(&Name::new("x.test"), &sources).await;
        assert_eq!(result[0].source(), "fast");
    }

    #[tokio::test]
    async fn test_losers_keep_running_detached() {
        let engine = engine(RaceStrategy::FirstCompleted);
        let sources = vec![
            FakeSource::new("fast", 1, &[[10, 0, 0, 1]]),
            FakeSource::new("slow", 200, &[[10, 0, 0, 2]]),
        ];
        let result = engine.race(&Name::new("x.test"), &sources).await;
        assert_eq!(result[0].source(), "fast");
        // The slow query still holds its permit after the race returned.
        assert_eq!(engine.in_flight(), 1);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(engine.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_panicking_source_does_not_stall_either_strategy() {
        let sources: Vec<Arc<dyn Source>> = vec![Arc::new(PanickingSource) as Arc<dyn Source>];
        for strategy in [
            RaceStrategy::FirstCompleted,
            RaceStrategy::Polling {
                interval: Duration::from_millis(5),
            },
        ] {
            let engine = RaceEngine::new(
                &ResolutionConfig::new()
                    .race_strategy(strategy)
                    .query_timeout(Duration::from_millis(200)),
            );
            let result = tokio::time::timeout(
                Duration::from_secs(2),
                engine.race(&Name::new("x.test"), &sources),
            )
            .await
            .expect("race must finish");
            assert!(result.is_empty(), "{strategy:?}");
            assert_eq!(engine.in_flight(), 0, "{strategy:?}");
        }
    }

    #[tokio::test]
    async fn test_panicking_source_does_not_block_winner_polling() {
        let sources: Vec<Arc<dyn Source>> = vec![
            Arc::new(PanickingSource) as Arc<dyn Source>,
            FakeSource::new("ok", 20, &[[10, 0, 0, 1]]),
        ];
        let result = engine(RaceStrategy::Polling {
            interval: Duration::from_millis(5),
        })
        .race(&Name::new("x.test"), &sources)
        .await;
        assert_eq!(result[0].source(), "ok");
    }

    #[tokio::test]
    async fn test_first_completed_all_empty() {
        let sources = vec![
            FakeSource::new("a", 1, &[]),
            FakeSource::new("b", 5, &[]),
            FakeSource::new("c", 10, &[]),
        ];
        let result = engine(RaceStrategy::FirstCompleted)
            .race(&Name::new("x.test"), &sources)
            .await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_capped_races_rotate_skipped_sources() {
        let engine = RaceEngine::new(
            &ResolutionConfig::new()
                .query_timeout(Duration::from_secs(1))
                .max_in_flight_queries(1),
        );
        let sources = vec![
            FakeSource::new("first", 0, &[[10, 0, 0, 1]]),
            FakeSource::new("second", 0, &[[10, 0, 0, 2]]),
        ];
        let name = Name::new("x.test");

        let winners: Vec<String> = [
            engine.race(&name, &sources).await,
            engine.race(&name, &sources).await,
        ]
        .iter()
        .map(|r| r[0].source().to_string())
        .collect();
        assert_eq!(winners, vec!["first", "second"]);
    }
}
