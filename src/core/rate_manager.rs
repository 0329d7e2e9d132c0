//! Cache-first rate acquisition with network refresh and stale fallback.
//!
//! A request for a base currency first publishes whatever is cached for that
//! base, then (when online) fetches a fresh table and overwrites the cache.
//! Failures never clear rates that are already visible; they only set
//! `error` on the snapshot.
//!
//! Every request is tagged with its base currency. The active base is the
//! `base` of the current snapshot, and results for any other base are dropped
//! when they arrive.

use crate::core::cache::KeyValueStore;
use crate::core::currency::normalize_code;
use crate::core::error::RateError;
use crate::core::rates::{CacheEntry, RateProvider, RateTable, load_cached, store_cached};
use chrono::{DateTime, Local, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateSnapshot {
    pub base: String,
    pub rates: RateTable,
    pub last_updated: Option<DateTime<Utc>>,
    pub is_loading: bool,
    pub error: Option<RateError>,
    pub is_offline: bool,
}

impl RateSnapshot {
    pub fn has_data(&self) -> bool {
        !self.rates.is_empty()
    }

    /// `last_updated` in local time, e.g. `2025-01-31 14:05:09`.
    pub fn last_updated_display(&self) -> Option<String> {
        self.last_updated.map(|ts| {
            ts.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
    }
}

pub struct RateCacheManager {
    provider: Arc<dyn RateProvider>,
    store: Arc<dyn KeyValueStore>,
    connectivity: watch::Receiver<bool>,
    state: watch::Sender<RateSnapshot>,
}

impl RateCacheManager {
    pub fn new(
        provider: Arc<dyn RateProvider>,
        store: Arc<dyn KeyValueStore>,
        connectivity: watch::Receiver<bool>,
    ) -> Self {
        let snapshot = RateSnapshot {
            is_offline: *connectivity.borrow(),
            ..RateSnapshot::default()
        };
        let (state, _rx) = watch::channel(snapshot);
        Self {
            provider,
            store,
            connectivity,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RateSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> RateSnapshot {
        self.state.borrow().clone()
    }

    /// Makes `base` the active base currency and loads its rates.
    ///
    /// Returns the snapshot after this request settles. If another base was
    /// requested meanwhile, that is the snapshot returned.
    #[instrument(name = "GetRates", skip(self))]
    pub async fn get_rates(&self, base: &str) -> RateSnapshot {
        let base = normalize_code(base);
        let is_offline = *self.connectivity.borrow();

        self.state.send_modify(|s| {
            if s.base != base {
                s.base = base.clone();
                s.rates = RateTable::new();
                s.last_updated = None;
            }
            s.is_loading = true;
            s.error = None;
            s.is_offline = is_offline;
        });

        if let Some(entry) = load_cached(self.store.as_ref(), &base) {
            debug!(base = %base, count = entry.rates.len(), "Serving cached rates");
            let fetched_at = entry.fetched_at();
            self.apply(&base, |s| {
                s.rates = entry.rates;
                s.last_updated = fetched_at;
            });
        }

        if is_offline {
            info!(base = %base, "Offline, skipping network fetch");
            self.apply(&base, |s| {
                s.is_loading = false;
                if s.rates.is_empty() {
                    s.error = Some(RateError::NoData);
                }
            });
            return self.snapshot();
        }

        match self.provider.fetch_rates(&base).await {
            Ok(rates) => {
                let now = Utc::now();
                let entry = CacheEntry::new(rates, now);
                if let Err(e) = store_cached(self.store.as_ref(), &base, &entry) {
                    warn!(base = %base, error = %e, "Failed to write rate cache");
                }
                self.apply(&base, |s| {
                    s.rates = entry.rates;
                    s.last_updated = Some(now);
                    s.error = None;
                    s.is_loading = false;
                });
            }
            Err(e) => {
                warn!(base = %base, error = %e, "Rate fetch failed, keeping cached rates");
                self.apply(&base, |s| {
                    s.error = Some(e);
                    s.is_loading = false;
                });
            }
        }

        self.snapshot()
    }

    /// Follows connectivity transitions until the monitor goes away. Coming
    /// back online reloads the active base.
    pub async fn run(self: Arc<Self>) {
        let mut rx = self.connectivity.clone();
        while rx.changed().await.is_ok() {
            let is_offline = *rx.borrow_and_update();
            self.state.send_modify(|s| s.is_offline = is_offline);

            let base = self.state.borrow().base.clone();
            if !is_offline && !base.is_empty() {
                info!(base = %base, "Back online, refreshing rates");
                self.get_rates(&base).await;
            }
        }
        debug!("Connectivity monitor closed");
    }

    /// Applies `update` only if `base` is still the active base.
    fn apply(&self, base: &str, update: impl FnOnce(&mut RateSnapshot)) -> bool {
        self.state.send_if_modified(|s| {
            if s.base == base {
                update(s);
                true
            } else {
                debug!(
                    requested = base,
                    active = %s.base,
                    "Discarding result for inactive base"
                );
                false
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::connectivity::ConnectivityMonitor;
    use crate::core::rates::cache_key;
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct MockProvider {
        responses: Mutex<HashMap<String, Result<RateTable, RateError>>>,
        gates: Mutex<HashMap<String, Arc<Notify>>>,
        call_count: AtomicUsize,
    }

    impl MockProvider {
        fn respond(&self, base: &str, result: Result<RateTable, RateError>) {
            self.responses
                .lock()
                .unwrap()
                .insert(base.to_string(), result);
        }

        /// Holds fetches for `base` until the returned gate is notified.
        fn gate(&self, base: &str) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            self.gates
                .lock()
                .unwrap()
                .insert(base.to_string(), Arc::clone(&gate));
            gate
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateProvider for MockProvider {
        async fn fetch_rates(&self, base: &str) -> Result<RateTable, RateError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            let gate = self.gates.lock().unwrap().get(base).cloned();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            self.responses
                .lock()
                .unwrap()
                .get(base)
                .cloned()
                .unwrap_or_else(|| Err(RateError::NetworkFailure("no route".to_string())))
        }
    }

    fn table(pairs: &[(&str, f64)]) -> RateTable {
        pairs.iter().map(|(c, r)| (*c, *r)).collect()
    }

    fn seed_cache(store: &MemoryStore, base: &str, rates: RateTable) -> DateTime<Utc> {
        let fetched_at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        store_cached(store, base, &CacheEntry::new(rates, fetched_at)).unwrap();
        fetched_at
    }

    fn build_manager(
        provider: &Arc<MockProvider>,
        store: &Arc<MemoryStore>,
        monitor: &ConnectivityMonitor,
    ) -> Arc<RateCacheManager> {
        Arc::new(RateCacheManager::new(
            Arc::clone(provider) as Arc<dyn RateProvider>,
            Arc::clone(store) as Arc<dyn KeyValueStore>,
            monitor.subscribe(),
        ))
    }

    async fn wait_for(
        rx: &mut watch::Receiver<RateSnapshot>,
        predicate: impl FnMut(&RateSnapshot) -> bool,
    ) {
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
            .await
            .expect("timed out waiting for snapshot")
            .expect("state channel closed");
    }

    #[tokio::test]
    async fn test_fresh_fetch_replaces_rates_and_writes_cache() {
        let provider = Arc::new(MockProvider::default());
        provider.respond("USD", Ok(table(&[("EUR", 0.95)])));
        let store = Arc::new(MemoryStore::new());
        seed_cache(&store, "USD", table(&[("EUR", 0.9), ("GBP", 0.8)]));
        let monitor = ConnectivityMonitor::new(false);
        let manager = build_manager(&provider, &store, &monitor);

        let snapshot = manager.get_rates("usd").await;

        assert_eq!(snapshot.base, "USD");
        assert_eq!(snapshot.rates, table(&[("EUR", 0.95)]));
        assert!(snapshot.error.is_none());
        assert!(!snapshot.is_loading);
        assert!(snapshot.last_updated.unwrap().timestamp() > 1_700_000_000);

        // Full overwrite, GBP is gone
        let cached = load_cached(store.as_ref(), "USD").unwrap();
        assert_eq!(cached.rates, table(&[("EUR", 0.95)]));
    }

    #[tokio::test]
    async fn test_cached_rates_visible_before_network_completes() {
        let provider = Arc::new(MockProvider::default());
        provider.respond("USD", Ok(table(&[("EUR", 0.95)])));
        let gate = provider.gate("USD");
        let store = Arc::new(MemoryStore::new());
        let fetched_at = seed_cache(&store, "USD", table(&[("EUR", 0.9)]));
        let monitor = ConnectivityMonitor::new(false);
        let manager = build_manager(&provider, &store, &monitor);
        let mut rx = manager.subscribe();

        let task = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.get_rates("USD").await })
        };

        wait_for(&mut rx, |s| s.rates.get("EUR") == Some(0.9)).await;
        let interim = manager.snapshot();
        assert!(interim.is_loading);
        assert_eq!(interim.last_updated, Some(fetched_at));

        gate.notify_one();
        let settled = task.await.unwrap();
        assert_eq!(settled.rates.get("EUR"), Some(0.95));
        assert!(!settled.is_loading);
    }

    #[tokio::test]
    async fn test_offline_serves_cache_without_network() {
        let provider = Arc::new(MockProvider::default());
        let store = Arc::new(MemoryStore::new());
        let fetched_at = seed_cache(&store, "USD", table(&[("INR", 83.0)]));
        let monitor = ConnectivityMonitor::new(true);
        let manager = build_manager(&provider, &store, &monitor);

        let snapshot = manager.get_rates("USD").await;

        assert_eq!(provider.calls(), 0);
        assert!(snapshot.is_offline);
        assert!(!snapshot.is_loading);
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.rates, table(&[("INR", 83.0)]));
        assert_eq!(snapshot.last_updated, Some(fetched_at));
    }

    #[tokio::test]
    async fn test_offline_without_cache_is_no_data() {
        let provider = Arc::new(MockProvider::default());
        let store = Arc::new(MemoryStore::new());
        let monitor = ConnectivityMonitor::new(true);
        let manager = build_manager(&provider, &store, &monitor);

        let snapshot = manager.get_rates("USD").await;

        assert_eq!(provider.calls(), 0);
        assert!(snapshot.is_offline);
        assert!(!snapshot.has_data());
        assert_eq!(snapshot.error, Some(RateError::NoData));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_cached_rates() {
        let provider = Arc::new(MockProvider::default());
        provider.respond(
            "USD",
            Err(RateError::NetworkFailure("HTTP 503".to_string())),
        );
        let store = Arc::new(MemoryStore::new());
        seed_cache(&store, "USD", table(&[("EUR", 0.9)]));
        let monitor = ConnectivityMonitor::new(false);
        let manager = build_manager(&provider, &store, &monitor);

        let snapshot = manager.get_rates("USD").await;

        assert_eq!(provider.calls(), 1);
        assert_eq!(snapshot.rates, table(&[("EUR", 0.9)]));
        assert_eq!(
            snapshot.error,
            Some(RateError::NetworkFailure("HTTP 503".to_string()))
        );
        // Cache untouched
        assert_eq!(
            load_cached(store.as_ref(), "USD").unwrap().rates,
            table(&[("EUR", 0.9)])
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_without_cache_is_empty_with_error() {
        let provider = Arc::new(MockProvider::default());
        provider.respond(
            "USD",
            Err(RateError::MalformedResponse("missing rates".to_string())),
        );
        let store = Arc::new(MemoryStore::new());
        let monitor = ConnectivityMonitor::new(false);
        let manager = build_manager(&provider, &store, &monitor);

        let snapshot = manager.get_rates("USD").await;

        assert!(!snapshot.has_data());
        assert!(matches!(
            snapshot.error,
            Some(RateError::MalformedResponse(_))
        ));
        assert!(store.get(&cache_key("USD")).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_switching_base_clears_previous_rates() {
        let provider = Arc::new(MockProvider::default());
        provider.respond("USD", Ok(table(&[("EUR", 0.9)])));
        let store = Arc::new(MemoryStore::new());
        let monitor = ConnectivityMonitor::new(false);
        let manager = build_manager(&provider, &store, &monitor);

        manager.get_rates("USD").await;
        let snapshot = manager.get_rates("GBP").await;

        assert_eq!(snapshot.base, "GBP");
        assert!(!snapshot.has_data());
        assert!(snapshot.error.is_some());
    }

    #[tokio::test]
    async fn test_late_result_for_previous_base_is_discarded() {
        let provider = Arc::new(MockProvider::default());
        provider.respond("USD", Ok(table(&[("EUR", 0.9)])));
        provider.respond("EUR", Ok(table(&[("USD", 1.1)])));
        let usd_gate = provider.gate("USD");
        let store = Arc::new(MemoryStore::new());
        let monitor = ConnectivityMonitor::new(false);
        let manager = build_manager(&provider, &store, &monitor);

        let usd_task = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.get_rates("USD").await })
        };
        while provider.calls() == 0 {
            tokio::task::yield_now().await;
        }

        let eur = manager.get_rates("EUR").await;
        assert_eq!(eur.rates, table(&[("USD", 1.1)]));

        usd_gate.notify_one();
        let after = usd_task.await.unwrap();

        assert_eq!(after.base, "EUR");
        assert_eq!(after.rates, table(&[("USD", 1.1)]));
        // The late result is still valid for its own cache key
        assert_eq!(
            load_cached(store.as_ref(), "USD").unwrap().rates,
            table(&[("EUR", 0.9)])
        );
    }

    #[tokio::test]
    async fn test_coming_online_refetches_active_base() {
        let provider = Arc::new(MockProvider::default());
        provider.respond("USD", Ok(table(&[("EUR", 0.95)])));
        let store = Arc::new(MemoryStore::new());
        seed_cache(&store, "USD", table(&[("EUR", 0.9)]));
        let monitor = ConnectivityMonitor::new(true);
        let manager = build_manager(&provider, &store, &monitor);
        let mut rx = manager.subscribe();

        let offline = manager.get_rates("USD").await;
        assert_eq!(offline.rates.get("EUR"), Some(0.9));
        assert_eq!(provider.calls(), 0);

        let runner = tokio::spawn(Arc::clone(&manager).run());

        monitor.set_offline(false);
        wait_for(&mut rx, |s| {
            !s.is_offline && !s.is_loading && s.rates.get("EUR") == Some(0.95)
        })
        .await;
        assert_eq!(provider.calls(), 1);

        monitor.set_offline(true);
        wait_for(&mut rx, |s| s.is_offline).await;
        assert_eq!(provider.calls(), 1);

        runner.abort();
    }
}
