use std::sync::Arc;

use parking_lot::RwLock;

use crate::{CourierConfig, CourierConfigSnapshot};

struct CourierAppInner {
    config: RwLock<CourierConfig>,
}

/// CourierApp is the central application container.
///
/// Framework-agnostic. Cheap to clone; clones share the same config.
#[derive(Clone)]
pub struct CourierApp {
    inner: Arc<CourierAppInner>,
}

impl Default for CourierApp {
    fn default() -> Self {
        Self::new()
    }
}

impl CourierApp {
    pub fn new() -> Self {
        Self::with_config(CourierConfig::new())
    }

    pub fn with_config(config: CourierConfig) -> Self {
        Self {
            inner: Arc::new(CourierAppInner {
                config: RwLock::new(config),
            }),
        }
    }

    /// `app.set(key, value)`
    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.config.write().set(key, value);
    }

    /// `app.get(key)`
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.config.read().get(key).map(|v| v.to_string())
    }

    pub fn config_snapshot(&self) -> CourierConfigSnapshot {
        self.inner.config.read().snapshot()
    }
}
