//! In-memory statistics cache.
//!
//! Memoizes aggregation results per (user, date range) with a time-to-live and
//! a capacity bound. Keys are structured values - an absent bound is a distinct
//! key component, never a sentinel date - so two ranges can only collide when
//! they are actually equal. The cache owns its internal consistency: lookups,
//! inserts, eviction, and invalidation are atomic with respect to each other,
//! and callers never hold a lock. A logical miss is a normal outcome, not an
//! error, which is why the getters return `Option` rather than `Result`.

use crate::core::statistics::{CategoryStatistics, Statistics};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// How long an entry stays fresh unless invalidated first.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Maximum number of entries kept per result kind.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Structured cache key: user plus the optional range bounds, compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    user_id: i64,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

struct CacheEntry<T> {
    value: T,
    inserted_at: Instant,
}

/// One TTL- and capacity-bounded map. Entries move `absent -> present` on put
/// and back to `absent` on TTL expiry or explicit invalidation; there are no
/// other states.
struct TtlMap<T> {
    entries: RwLock<HashMap<CacheKey, CacheEntry<T>>>,
    ttl: Duration,
    capacity: usize,
}

impl<T: Clone> TtlMap<T> {
    fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    /// Looks up a fresh entry. Expired entries are treated as absent without
    /// being removed; they are reaped lazily on the next insert under pressure.
    async fn get(&self, key: &CacheKey) -> Option<T> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    async fn put(&self, key: CacheKey, value: T) {
        let mut entries = self.entries.write().await;

        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            // Reap expired entries first; fall back to evicting the oldest
            let ttl = self.ttl;
            entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
            while entries.len() >= self.capacity {
                let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.inserted_at)
                    .map(|(key, _)| key.clone())
                else {
                    break;
                };
                trace!("Evicting cache entry for user {}", oldest.user_id);
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    async fn invalidate_user(&self, user_id: i64) {
        let mut entries = self.entries.write().await;
        entries.retain(|key, _| key.user_id != user_id);
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Time-expiring memoization layer in front of the aggregation engine.
///
/// Shared across all concurrent requests for the process lifetime; the tracker
/// invalidates a user's entries synchronously before any mutating ledger call
/// returns.
pub struct StatsCache {
    statistics: TtlMap<Statistics>,
    by_category: TtlMap<Vec<CategoryStatistics>>,
}

impl StatsCache {
    /// Cache with the default TTL (5 minutes) and capacity (1000 entries).
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_TTL, DEFAULT_CAPACITY)
    }

    /// Cache with explicit TTL and capacity, used by configuration and tests.
    #[must_use]
    pub fn with_settings(ttl: Duration, capacity: usize) -> Self {
        Self {
            statistics: TtlMap::new(ttl, capacity),
            by_category: TtlMap::new(ttl, capacity),
        }
    }

    /// Fresh statistics for the exact (user, range) key, if any.
    pub async fn get_statistics(
        &self,
        user_id: i64,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Option<Statistics> {
        self.statistics
            .get(&CacheKey {
                user_id,
                start,
                end,
            })
            .await
    }

    /// Stores a fully computed statistics snapshot.
    pub async fn put_statistics(
        &self,
        user_id: i64,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        value: Statistics,
    ) {
        self.statistics
            .put(
                CacheKey {
                    user_id,
                    start,
                    end,
                },
                value,
            )
            .await;
    }

    /// Fresh category statistics for the exact (user, range) key, if any.
    pub async fn get_category_statistics(
        &self,
        user_id: i64,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Option<Vec<CategoryStatistics>> {
        self.by_category
            .get(&CacheKey {
                user_id,
                start,
                end,
            })
            .await
    }

    /// Stores a fully computed category-statistics list.
    pub async fn put_category_statistics(
        &self,
        user_id: i64,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        value: Vec<CategoryStatistics>,
    ) {
        self.by_category
            .put(
                CacheKey {
                    user_id,
                    start,
                    end,
                },
                value,
            )
            .await;
    }

    /// Removes every entry belonging to `user_id`, whatever its date range.
    ///
    /// This is the one correctness-critical operation: it must complete before
    /// the mutating ledger call that triggered it returns, so a follow-up read
    /// in the same causal chain can never see pre-mutation numbers.
    pub async fn invalidate_user(&self, user_id: i64) {
        debug!("Invalidating cached statistics for user {user_id}");
        self.statistics.invalidate_user(user_id).await;
        self.by_category.invalidate_user(user_id).await;
    }
}

impl Default for StatsCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::statistics::summarize;
    use crate::test_utils::utc;
    use rust_decimal::Decimal;

    fn empty_stats() -> Statistics {
        summarize(Vec::new())
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let cache = StatsCache::new();
        assert!(cache.get_statistics(1, None, None).await.is_none());

        cache.put_statistics(1, None, None, empty_stats()).await;
        let hit = cache.get_statistics(1, None, None).await;
        assert!(hit.is_some());
        assert_eq!(hit.map(|s| s.balance), Some(Decimal::ZERO));
    }

    #[tokio::test]
    async fn test_absent_bounds_are_distinct_keys() {
        let cache = StatsCache::new();
        let day = utc(2024, 1, 1, 0, 0, 0);

        cache.put_statistics(1, None, None, empty_stats()).await;
        cache.put_statistics(1, Some(day), None, empty_stats()).await;

        // All four bound shapes are distinct keys
        assert!(cache.get_statistics(1, None, None).await.is_some());
        assert!(cache.get_statistics(1, Some(day), None).await.is_some());
        assert!(cache.get_statistics(1, None, Some(day)).await.is_none());
        assert!(cache.get_statistics(1, Some(day), Some(day)).await.is_none());
    }

    #[tokio::test]
    async fn test_user_ids_do_not_collide() {
        // Structured keys: user 1 must never shadow user 11
        let cache = StatsCache::new();
        cache.put_statistics(1, None, None, empty_stats()).await;
        assert!(cache.get_statistics(11, None, None).await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_user_removes_all_ranges_for_that_user_only() {
        let cache = StatsCache::new();
        let day = utc(2024, 1, 1, 0, 0, 0);

        cache.put_statistics(1, None, None, empty_stats()).await;
        cache.put_statistics(1, Some(day), Some(day), empty_stats()).await;
        cache.put_category_statistics(1, None, None, Vec::new()).await;
        cache.put_statistics(2, None, None, empty_stats()).await;

        cache.invalidate_user(1).await;

        assert!(cache.get_statistics(1, None, None).await.is_none());
        assert!(cache.get_statistics(1, Some(day), Some(day)).await.is_none());
        assert!(cache.get_category_statistics(1, None, None).await.is_none());
        assert!(cache.get_statistics(2, None, None).await.is_some());
    }

    #[tokio::test]
    async fn test_ttl_expiry_is_lazy() {
        let cache = StatsCache::with_settings(Duration::from_millis(50), 10);
        cache.put_statistics(1, None, None, empty_stats()).await;

        // Present before the TTL elapses
        assert!(cache.get_statistics(1, None, None).await.is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;

        // Absent afterwards, with no explicit eviction having run
        assert!(cache.get_statistics(1, None, None).await.is_none());
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let cache = StatsCache::with_settings(Duration::from_secs(60), 3);

        for user_id in 1..=3 {
            cache.put_statistics(user_id, None, None, empty_stats()).await;
        }
        assert_eq!(cache.statistics.len().await, 3);

        cache.put_statistics(4, None, None, empty_stats()).await;
        assert_eq!(cache.statistics.len().await, 3);

        // The oldest entry (user 1) was evicted; the newest survives
        assert!(cache.get_statistics(1, None, None).await.is_none());
        assert!(cache.get_statistics(4, None, None).await.is_some());
    }

    #[tokio::test]
    async fn test_capacity_reaps_expired_before_evicting_fresh() {
        let cache = StatsCache::with_settings(Duration::from_millis(50), 2);

        cache.put_statistics(1, None, None, empty_stats()).await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        cache.put_statistics(2, None, None, empty_stats()).await;

        // Inserting a third entry reaps the expired user-1 entry instead of
        // evicting the still-fresh user-2 entry
        cache.put_statistics(3, None, None, empty_stats()).await;
        assert!(cache.get_statistics(2, None, None).await.is_some());
        assert!(cache.get_statistics(3, None, None).await.is_some());
    }

    #[tokio::test]
    async fn test_overwriting_a_key_refreshes_it() {
        let cache = StatsCache::with_settings(Duration::from_millis(100), 10);
        cache.put_statistics(1, None, None, empty_stats()).await;
        tokio::time::sleep(Duration::from_millis(60)).await;

        cache.put_statistics(1, None, None, empty_stats()).await;
        tokio::time::sleep(Duration::from_millis(60)).await;

        // 120ms after the first put but only 60ms after the second
        assert!(cache.get_statistics(1, None, None).await.is_some());
    }
}
