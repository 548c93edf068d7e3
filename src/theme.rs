//! Persisted light/dark preference.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

use crate::storage::KeyValueStore;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(()),
        }
    }
}

pub struct ThemePreference {
    store: Arc<dyn KeyValueStore>,
    key: String,
    fallback: Theme,
}

impl ThemePreference {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, fallback: Theme) -> Self {
        Self {
            store,
            key: key.into(),
            fallback,
        }
    }

    /// Saved theme, or the configured default when nothing usable is stored.
    pub async fn current(&self) -> Theme {
        match self.store.get(&self.key).await {
            Ok(Some(saved)) => saved.parse().unwrap_or(self.fallback),
            Ok(None) => self.fallback,
            Err(err) => {
                warn!(?err, "failed to read theme preference");
                self.fallback
            }
        }
    }

    /// Make `theme` current and persist it; a failed write only logs.
    pub async fn apply(&self, theme: Theme) -> Theme {
        if let Err(err) = self.store.set(&self.key, theme.as_str()).await {
            warn!(?err, %theme, "failed to persist theme preference");
        }
        theme
    }

    pub async fn toggle(&self) -> Theme {
        let next = self.current().await.toggled();
        self.apply(next).await
    }
}
