//! Last-known-good menu cache on top of a [`KeyValueStore`].
//!
//! The dataset and its write time live under two separate keys. Entries are
//! never invalidated explicitly; freshness is decided at read time against the
//! configured TTL.
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::config::Menu;
use crate::error::{StorageError, ValidationError};
use crate::model::MenuDataset;
use crate::normalize::normalize_str;
use crate::storage::KeyValueStore;

/// Wall clock in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicI64);

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self(AtomicI64::new(now_ms))
    }

    pub fn set(&self, now_ms: i64) {
        self.0.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.0.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub key: String,
    pub ts_key: String,
    pub ttl: Duration,
}

impl CacheSettings {
    pub fn from_config(menu: &Menu) -> Self {
        Self {
            key: menu.cache_key.clone(),
            ts_key: menu.cache_ts_key.clone(),
            ttl: menu.cache_ttl(),
        }
    }
}

/// Summary of the stored entry, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntryInfo {
    pub fetched_at_ms: Option<i64>,
    pub age_ms: Option<i64>,
    pub fresh: bool,
    pub categories: usize,
    pub menu_items: usize,
}

#[derive(Clone)]
pub struct MenuCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    settings: CacheSettings,
}

impl std::fmt::Debug for MenuCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuCache")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl MenuCache {
    pub fn new(store: Arc<dyn KeyValueStore>, settings: CacheSettings) -> Self {
        Self::with_clock(store, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn KeyValueStore>,
        settings: CacheSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Return the cached dataset, re-normalized. With `allow_stale == false`
    /// an entry older than the TTL (or without a usable timestamp) is a miss.
    #[instrument(skip(self))]
    pub async fn read(&self, allow_stale: bool) -> Option<MenuDataset> {
        let (dataset, fetched_at) = self.load_entry().await?;
        if !allow_stale {
            let fetched_at = fetched_at?;
            if self.age_ms(fetched_at) > self.ttl_ms() {
                debug!(fetched_at, "cached menu is stale");
                return None;
            }
        }
        Some(dataset)
    }

    /// Store `dataset` and stamp it with the current time.
    #[instrument(skip_all)]
    pub async fn write(&self, dataset: &MenuDataset) -> Result<(), StorageError> {
        let payload = serde_json::to_string(dataset)?;
        // Payload first: without a matching stamp it is only served stale.
        self.store.set(&self.settings.key, &payload).await?;
        self.store
            .set(&self.settings.ts_key, &self.clock.now_ms().to_string())
            .await?;
        debug!(
            categories = dataset.categories.len(),
            menu_items = dataset.menu_items.len(),
            "menu cache written"
        );
        Ok(())
    }

    pub async fn inspect(&self) -> Option<CacheEntryInfo> {
        let (dataset, fetched_at) = self.load_entry().await?;
        let age_ms = fetched_at.map(|ts| self.age_ms(ts));
        Some(CacheEntryInfo {
            fetched_at_ms: fetched_at,
            age_ms,
            fresh: age_ms.is_some_and(|age| age <= self.ttl_ms()),
            categories: dataset.categories.len(),
            menu_items: dataset.menu_items.len(),
        })
    }

    /// Stored dataset, re-normalized, plus its timestamp if parseable.
    async fn load_entry(&self) -> Option<(MenuDataset, Option<i64>)> {
        let raw = match self.store.get(&self.settings.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(?err, "failed to read menu cache");
                return None;
            }
        };
        let dataset = match normalize_str(&raw) {
            Ok(dataset) => dataset,
            Err(ValidationError::NotJson(err)) => {
                warn!(%err, "cached menu is not valid JSON");
                return None;
            }
            Err(ValidationError::MalformedPayload) => {
                warn!("cached menu is malformed");
                return None;
            }
        };

        let fetched_at = match self.store.get(&self.settings.ts_key).await {
            Ok(ts) => ts.and_then(|ts| ts.trim().parse::<i64>().ok()),
            Err(err) => {
                warn!(?err, "failed to read menu cache timestamp");
                None
            }
        };
        Some((dataset, fetched_at))
    }

    fn age_ms(&self, fetched_at: i64) -> i64 {
        self.clock.now_ms().saturating_sub(fetched_at)
    }

    fn ttl_ms(&self) -> i64 {
        i64::try_from(self.settings.ttl.as_millis()).unwrap_or(i64::MAX)
    }
}
