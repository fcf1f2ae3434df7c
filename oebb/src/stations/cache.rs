//! Memoised station lookups.
//!
//! Station names resolve to the same candidates for any session, so results
//! are shared across sessions and only expire by age.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::{CredentialBundle, StationRef};
use crate::oebb::ApiError;

use super::lookup::StationLookup;

/// Configuration for the station cache.
#[derive(Debug, Clone)]
pub struct StationCacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached queries.
    pub max_capacity: u64,
}

impl Default for StationCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            max_capacity: 1000,
        }
    }
}

/// Station lookup with caching.
///
/// Wraps another [`StationLookup`]. Queries are normalised (trimmed and
/// lower-cased) before keying. Empty results are not cached so that a
/// transient miss does not stick.
pub struct CachedStationLookup<L> {
    inner: L,
    cache: MokaCache<String, Arc<Vec<StationRef>>>,
}

impl<L: StationLookup> CachedStationLookup<L> {
    /// Create a new cached lookup.
    pub fn new(inner: L, config: &StationCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, cache }
    }

    /// Get the wrapped lookup.
    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// Number of cached queries (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

fn cache_key(query: &str) -> String {
    query.trim().to_lowercase()
}

impl<L: StationLookup + Sync> StationLookup for CachedStationLookup<L> {
    async fn lookup(
        &self,
        query: &str,
        creds: &CredentialBundle,
    ) -> Result<Vec<StationRef>, ApiError> {
        let key = cache_key(query);

        if let Some(cached) = self.cache.get(&key).await {
            debug!(query, "station cache hit");
            return Ok(cached.as_ref().clone());
        }

        let stations = self.inner.lookup(query, creds).await?;

        if !stations.is_empty() {
            self.cache.insert(key, Arc::new(stations.clone())).await;
        }

        Ok(stations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Returns one station named after the query, or nothing for "nowhere".
    #[derive(Default)]
    struct CountingLookup {
        calls: AtomicU32,
    }

    impl StationLookup for CountingLookup {
        async fn lookup(
            &self,
            query: &str,
            _creds: &CredentialBundle,
        ) -> Result<Vec<StationRef>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if query.trim().eq_ignore_ascii_case("nowhere") {
                return Ok(vec![]);
            }
            Ok(vec![StationRef::from_names(0, 0, Some(query.trim()), None, 1)])
        }
    }

    fn creds() -> CredentialBundle {
        CredentialBundle {
            access_token: "token".into(),
            channel: "inet".into(),
            session_id: "session".into(),
            support_id: "support".into(),
            expires_in_secs: 1800,
            issued_at: Utc::now(),
        }
    }

    fn calls(lookup: &CachedStationLookup<CountingLookup>) -> u32 {
        lookup.inner().calls.load(Ordering::SeqCst)
    }

    #[test]
    fn key_normalisation() {
        assert_eq!(cache_key("  Wien Hbf "), "wien hbf");
        assert_eq!(cache_key("SALZBURG"), "salzburg");
    }

    #[tokio::test]
    async fn repeated_query_hits_cache() {
        let lookup = CachedStationLookup::new(CountingLookup::default(), &Default::default());

        let first = lookup.lookup("Salzburg", &creds()).await.unwrap();
        let second = lookup.lookup(" salzburg ", &creds()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls(&lookup), 1);
    }

    #[tokio::test]
    async fn distinct_queries_miss() {
        let lookup = CachedStationLookup::new(CountingLookup::default(), &Default::default());

        lookup.lookup("Linz", &creds()).await.unwrap();
        lookup.lookup("Graz", &creds()).await.unwrap();

        assert_eq!(calls(&lookup), 2);
    }

    #[tokio::test]
    async fn empty_results_are_not_cached() {
        let lookup = CachedStationLookup::new(CountingLookup::default(), &Default::default());

        assert!(lookup.lookup("nowhere", &creds()).await.unwrap().is_empty());
        assert!(lookup.lookup("nowhere", &creds()).await.unwrap().is_empty());

        assert_eq!(calls(&lookup), 2);
    }
}
