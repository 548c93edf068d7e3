//! Acquisition order for menu data.
//!
//! 1. fresh cache (skips the network entirely)
//! 2. one remote fetch, written through to the cache on success
//! 3. stale cache
//! 4. bundled default
//!
//! No tier ever raises: failures are logged and the next tier is tried.
use once_cell::sync::Lazy;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::cache::{CacheSettings, MenuCache};
use crate::config::Config;
use crate::error::TransportError;
use crate::model::MenuDataset;
use crate::normalize::{is_valid_shape, normalize};
use crate::source::{HttpMenuSource, MenuSource};
use crate::storage::KeyValueStore;

const BUNDLED_MENU: &str = include_str!("../assets/menu-default.json");

static BUNDLED_DEFAULT: Lazy<Option<Value>> = Lazy::new(|| serde_json::from_str(BUNDLED_MENU).ok());

/// The menu shipped with the binary, if it parses.
pub fn bundled_default() -> Option<&'static Value> {
    (*BUNDLED_DEFAULT).as_ref()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    FreshCache,
    Remote,
    StaleCache,
    Bundled,
}

impl DataOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataOrigin::FreshCache => "fresh_cache",
            DataOrigin::Remote => "remote",
            DataOrigin::StaleCache => "stale_cache",
            DataOrigin::Bundled => "bundled",
        }
    }
}

impl fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedMenu {
    pub dataset: MenuDataset,
    pub origin: DataOrigin,
}

pub struct MenuLoader {
    source: Option<Arc<dyn MenuSource>>,
    cache: MenuCache,
    fallback: Option<Value>,
}

impl fmt::Debug for MenuLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuLoader")
            .field("has_source", &self.source.is_some())
            .field("cache", &self.cache)
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

impl MenuLoader {
    /// Loader with only the cache tiers; add sources with the builder methods.
    pub fn new(cache: MenuCache) -> Self {
        Self {
            source: None,
            cache,
            fallback: None,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn MenuSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Raw payload used as the last tier; normalized at load time.
    pub fn with_fallback(mut self, raw: Value) -> Self {
        self.fallback = Some(raw);
        self
    }

    pub fn with_bundled_default(self) -> Self {
        match bundled_default() {
            Some(raw) => self.with_fallback(raw.clone()),
            None => {
                error!("bundled default menu failed to parse");
                self
            }
        }
    }

    /// Wire the HTTP source, cache and bundled default as configured.
    pub fn from_config(cfg: &Config, store: Arc<dyn KeyValueStore>) -> Self {
        let cache = MenuCache::new(store, CacheSettings::from_config(&cfg.menu));
        let mut loader = Self::new(cache);
        match HttpMenuSource::from_config(&cfg.menu) {
            Ok(source) => loader = loader.with_source(Arc::new(source)),
            Err(TransportError::MissingEndpoint) => {
                warn!("menu.api_url missing; remote menu disabled")
            }
            Err(err) => warn!(?err, "menu source unusable; remote menu disabled"),
        }
        if cfg.menu.use_bundled_default {
            loader = loader.with_bundled_default();
        }
        loader
    }

    pub fn cache(&self) -> &MenuCache {
        &self.cache
    }

    #[instrument(skip_all)]
    pub async fn load(&self) -> Option<LoadedMenu> {
        if let Some(dataset) = self.cache.read(false).await {
            info!("using fresh cached menu");
            return Some(LoadedMenu {
                dataset,
                origin: DataOrigin::FreshCache,
            });
        }

        if let Some(dataset) = self.fetch_remote().await {
            if let Err(err) = self.cache.write(&dataset).await {
                warn!(?err, "failed to write menu cache");
            }
            return Some(LoadedMenu {
                dataset,
                origin: DataOrigin::Remote,
            });
        }

        if let Some(dataset) = self.cache.read(true).await {
            warn!("using cached menu data");
            return Some(LoadedMenu {
                dataset,
                origin: DataOrigin::StaleCache,
            });
        }

        if let Some(raw) = self.fallback.as_ref().filter(|raw| is_valid_shape(raw)) {
            if let Ok(dataset) = normalize(raw) {
                warn!("using bundled default menu");
                return Some(LoadedMenu {
                    dataset,
                    origin: DataOrigin::Bundled,
                });
            }
        }

        error!("menu data not found from remote, cache, or bundled default");
        None
    }

    async fn fetch_remote(&self) -> Option<MenuDataset> {
        let source = self.source.as_ref()?;
        let raw = match source.fetch().await {
            Ok(raw) => raw,
            Err(TransportError::Status(status)) => {
                warn!(status, "menu endpoint returned non-success status");
                return None;
            }
            Err(TransportError::NotJson) => {
                warn!("menu endpoint returned non-JSON response");
                return None;
            }
            Err(err) => {
                warn!(?err, "menu fetch failed");
                return None;
            }
        };
        match normalize(&raw) {
            Ok(dataset) => Some(dataset),
            Err(err) => {
                warn!(?err, "menu payload is malformed (missing categories/menuItems arrays)");
                None
            }
        }
    }
}
