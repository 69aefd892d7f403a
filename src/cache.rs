// Epoch cache - single-value TTL cache for the current ledger epoch
//
// Owned and injected explicitly (no module-level globals) so stake-status
// derivation can run against a fake clock in tests. A stale value is served
// when a refresh fails; serving stale beats hard-failing a classification.

use parking_lot::Mutex;
use std::future::Future;
use std::time::{Duration, Instant};

use crate::errors::FetchError;
use crate::logger::{self, LogTag};
use crate::rpc::LedgerRpc;

/// Configuration for the epoch cache
#[derive(Debug, Clone)]
pub struct EpochCacheConfig {
    /// How long a fetched epoch stays fresh
    pub ttl: Duration,
}

impl Default for EpochCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedEpoch {
    epoch: u64,
    fetched_at: Instant,
}

/// Single-value cache of the current ledger epoch
#[derive(Debug)]
pub struct EpochCache {
    ttl: Duration,
    state: Mutex<Option<CachedEpoch>>,
}

impl EpochCache {
    pub fn new(config: EpochCacheConfig) -> Self {
        Self {
            ttl: config.ttl,
            state: Mutex::new(None),
        }
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self::new(EpochCacheConfig { ttl })
    }

    /// Current epoch via the RPC collaborator, refreshing only past the TTL
    pub async fn current_epoch(&self, rpc: &dyn LedgerRpc) -> Option<u64> {
        self.get_or_refresh(Instant::now(), || rpc.get_epoch()).await
    }

    /// Get-or-refresh against an explicit `now`, for fake-clock tests
    ///
    /// Refresh failure degrades to the last cached value when one exists,
    /// however stale it is; `None` only when no epoch was ever fetched.
    pub async fn get_or_refresh<F, Fut>(&self, now: Instant, refresh: F) -> Option<u64>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<u64, FetchError>>,
    {
        if let Some(cached) = *self.state.lock() {
            if now.duration_since(cached.fetched_at) < self.ttl {
                return Some(cached.epoch);
            }
        }

        match refresh().await {
            Ok(epoch) => {
                *self.state.lock() = Some(CachedEpoch {
                    epoch,
                    fetched_at: now,
                });
                Some(epoch)
            }
            Err(e) => {
                let stale = self.state.lock().map(|c| c.epoch);
                logger::debug(
                    LogTag::Cache,
                    "EPOCH_REFRESH_FAILED",
                    &format!("serving stale={:?} after refresh error: {}", stale, e),
                );
                stale
            }
        }
    }
}

impl Default for EpochCache {
    fn default() -> Self {
        Self::new(EpochCacheConfig::default())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn transport_err() -> FetchError {
        FetchError::Transport("connection refused".to_string())
    }

    #[tokio::test]
    async fn fresh_value_skips_refresh() {
        let cache = EpochCache::with_ttl(Duration::from_secs(60));
        let t0 = Instant::now();

        let first = cache.get_or_refresh(t0, || async { Ok(500) }).await;
        assert_eq!(first, Some(500));

        // Within TTL the refresh closure must not run.
        let second = cache
            .get_or_refresh(t0 + Duration::from_secs(30), || async {
                panic!("refresh called while fresh")
            })
            .await;
        assert_eq!(second, Some(500));
    }

    #[tokio::test]
    async fn expired_value_triggers_refresh() {
        let cache = EpochCache::with_ttl(Duration::from_secs(60));
        let t0 = Instant::now();

        cache.get_or_refresh(t0, || async { Ok(500) }).await;
        let refreshed = cache
            .get_or_refresh(t0 + Duration::from_secs(61), || async { Ok(501) })
            .await;
        assert_eq!(refreshed, Some(501));
    }

    #[tokio::test]
    async fn stale_value_served_on_refresh_failure() {
        let cache = EpochCache::with_ttl(Duration::from_secs(60));
        let t0 = Instant::now();

        cache.get_or_refresh(t0, || async { Ok(500) }).await;
        let stale = cache
            .get_or_refresh(t0 + Duration::from_secs(120), || async { Err(transport_err()) })
            .await;
        assert_eq!(stale, Some(500));
    }

    #[tokio::test]
    async fn empty_cache_with_failing_refresh_yields_none() {
        let cache = EpochCache::with_ttl(Duration::from_secs(60));
        let got = cache
            .get_or_refresh(Instant::now(), || async { Err(transport_err()) })
            .await;
        assert_eq!(got, None);
    }
}
