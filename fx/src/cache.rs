//! Rate set caching with TTL support.

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use ptax_common::{constants, RateSet};
use std::sync::Arc;
use tracing::debug;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Today's calendar date in the host's local time zone.
    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&Local).date_naive()
    }
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Cached rate set.
#[derive(Debug, Clone)]
struct CacheEntry {
    rates: RateSet,
    stored_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_live(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.stored_at) < ttl
    }
}

/// Thread-safe cache of resolved rate sets keyed by calendar date.
///
/// Entries are dropped lazily: an entry found expired on read is evicted.
/// There is no size bound.
pub struct RateCache {
    cache: DashMap<String, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl RateCache {
    /// Create a cache with the standard five minute TTL.
    pub fn new() -> Self {
        Self::with_ttl(constants::cache_ttl())
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a cache with a custom TTL and time source.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// Get a rate set if present and younger than the TTL.
    pub fn get(&self, key: &str) -> Option<RateSet> {
        let now = self.clock.now();

        if let Some(entry) = self.cache.get(key) {
            if entry.is_live(now, self.ttl) {
                debug!(key = %key, "Cache hit");
                return Some(entry.rates.clone());
            }
            debug!(key = %key, "Cache entry expired");
            drop(entry);
            self.evict_stale(key, now);
        }

        debug!(key = %key, "Cache miss");
        None
    }

    /// Remove the entry for `key` only if it is still stale at `now`; a
    /// concurrent `put` between the read and the removal survives.
    fn evict_stale(&self, key: &str, now: DateTime<Utc>) {
        self.cache
            .remove_if(key, |_, entry| !entry.is_live(now, self.ttl));
    }

    /// Store a rate set, replacing any previous entry for the key.
    pub fn put(&self, key: impl Into<String>, rates: RateSet) {
        let entry = CacheEntry {
            rates,
            stored_at: self.clock.now(),
        };
        self.cache.insert(key.into(), entry);
    }

    /// Clear all cached rate sets.
    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let total = self.cache.len();
        let live = self
            .cache
            .iter()
            .filter(|e| e.is_live(now, self.ttl))
            .count();

        CacheStats {
            total_entries: total,
            live_entries: live,
            expired_entries: total - live,
        }
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub live_entries: usize,
    pub expired_entries: usize,
}

/// Shared rate cache.
pub type SharedRateCache = Arc<RateCache>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ptax_common::{Currency, CurrencyKind, PtaxRate};
    use rust_decimal_macros::dec;

    fn make_set(code: &str) -> RateSet {
        RateSet::new(vec![PtaxRate {
            date: NaiveDate::from_ymd_opt(2025, 12, 15).unwrap(),
            numeric_code: 220,
            kind: CurrencyKind::A,
            currency: Currency::new(code),
            buy_rate: dec!(5.00),
            sell_rate: dec!(5.10),
            buy_parity: dec!(1),
            sell_parity: dec!(1),
        }])
    }

    fn manual_cache() -> (Arc<ManualClock>, RateCache) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 12, 15, 12, 0, 0).unwrap(),
        ));
        let cache = RateCache::with_clock(Duration::minutes(5), clock.clone());
        (clock, cache)
    }

    #[test]
    fn test_cache_put_and_get() {
        let (_, cache) = manual_cache();
        cache.put("2025-12-15", make_set("USD"));

        let cached = cache.get("2025-12-15").unwrap();
        assert_eq!(cached, make_set("USD"));
    }

    #[test]
    fn test_cache_miss() {
        let (_, cache) = manual_cache();
        assert!(cache.get("2025-12-15").is_none());
    }

    #[test]
    fn test_cache_expiry_evicts_on_read() {
        let (clock, cache) = manual_cache();
        cache.put("2025-12-15", make_set("USD"));

        clock.advance(Duration::minutes(4) + Duration::seconds(59));
        assert!(cache.get("2025-12-15").is_some());

        // age == ttl is already stale
        clock.advance(Duration::seconds(1));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("2025-12-15").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_eviction_spares_entry_written_after_read() {
        let (clock, cache) = manual_cache();
        cache.put("2025-12-15", make_set("USD"));
        clock.advance(Duration::minutes(6));

        // Another task refreshes the key between the expired read and the eviction.
        let read_at = clock.now();
        cache.put("2025-12-15", make_set("EUR"));
        cache.evict_stale("2025-12-15", read_at);

        let cached = cache.get("2025-12-15").unwrap();
        assert!(cached.find("EUR").is_some());

        clock.advance(Duration::minutes(6));
        cache.evict_stale("2025-12-15", clock.now());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_refreshes_timestamp() {
        let (clock, cache) = manual_cache();
        cache.put("2025-12-15", make_set("USD"));
        clock.advance(Duration::minutes(4));
        cache.put("2025-12-15", make_set("EUR"));
        clock.advance(Duration::minutes(4));

        let cached = cache.get("2025-12-15").unwrap();
        assert!(cached.find("EUR").is_some());
    }

    #[test]
    fn test_cache_clear() {
        let (_, cache) = manual_cache();
        cache.put("2025-12-15", make_set("USD"));
        cache.put("2025-12-12", make_set("USD"));
        assert_eq!(cache.len(), 2);

        cache.clear();

        assert!(cache.is_empty());
    }

    #[test]
    fn test_stats() {
        let (clock, cache) = manual_cache();
        cache.put("2025-12-12", make_set("USD"));
        clock.advance(Duration::minutes(10));
        cache.put("2025-12-15", make_set("USD"));

        assert_eq!(
            cache.stats(),
            CacheStats {
                total_entries: 2,
                live_entries: 1,
                expired_entries: 1,
            }
        );
    }

    #[test]
    fn test_manual_clock_today() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 12, 14, 23, 0, 0).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 12, 14).unwrap());
        clock.set(Utc.with_ymd_and_hms(2025, 12, 15, 1, 0, 0).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 12, 15).unwrap());
    }
}
