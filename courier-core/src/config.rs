//! # Courier Configuration
//!
//! A minimal string key/value store in the style of `app.set()` /
//! `app.get()`. Values are layered by the application: defaults first,
//! then environment variables, then explicit overrides.
//!
//! ```rust
//! use courier_core::CourierConfig;
//! let mut config = CourierConfig::new();
//!
//! config.set("http.port", "3000");
//! assert_eq!(config.get("http.port"), Some("3000"));
//! ```
//!
//! ## Environment overrides
//! Any variable with the configured prefix is folded into the store:
//! `COURIER__STORAGE__BACKEND=memory` becomes `storage.backend = memory`.

use std::collections::HashMap;

use anyhow::{anyhow, Result};

#[derive(Debug, Default)]
pub struct CourierConfig {
    values: HashMap<String, String>,
}

impl CourierConfig {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Set a key only if nothing has been set for it yet.
    pub fn set_default<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Fold prefixed variables into the store.
    ///
    /// `{prefix}SECTION__NAME` → `section.name`
    pub fn load_prefixed<I>(&mut self, prefix: &str, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                let normalized = stripped.to_lowercase().replace("__", ".");
                if !normalized.is_empty() {
                    self.values.insert(normalized, value);
                }
            }
        }
    }

    /// Copy an exact environment variable onto a config key, if present.
    pub fn map_var<I>(&mut self, vars: I, var: &str, key: &str)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        if let Some((_, value)) = vars.into_iter().find(|(k, _)| k == var) {
            self.values.insert(key.to_string(), value);
        }
    }

    pub fn snapshot(&self) -> CourierConfigSnapshot {
        CourierConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CourierConfigSnapshot {
    map: HashMap<String, String>,
}

impl CourierConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map
            .get(key)
            .map(|s| s.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.trim().parse::<usize>().ok())
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    /// Like `get_string`, but a missing key is an error naming the key.
    pub fn require(&self, key: &str) -> Result<String> {
        self.get_string(key)
            .ok_or_else(|| anyhow!("missing configuration value: {key}"))
    }
}
