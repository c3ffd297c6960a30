//! # Configuration
//!
//! A minimal string key/value store. Defaults are set in code, then
//! environment variables are layered on top:
//!
//! ```rust
//! use clinic_core::ClinicConfig;
//! let mut config = ClinicConfig::new();
//!
//! config.set("http.port", "3000");
//! config.set("errors.locale", "pt-BR");
//!
//! assert_eq!(config.get("http.port"), Some("3000"));
//! ```
//!
//! `load_env("CLINIC__")` maps `CLINIC__ERRORS__LOCALE=en` onto
//! `errors.locale`.

use std::collections::HashMap;
use std::str::FromStr;

use crate::messages::{Locale, MessageCatalog};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing configuration key `{0}`")]
    Missing(String),

    #[error("invalid value for `{key}`: {value:?}")]
    Invalid { key: String, value: String },
}

#[derive(Debug, Default)]
pub struct ClinicConfig {
    values: HashMap<String, String>,
}

impl ClinicConfig {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Store with the API's defaults filled in.
    pub fn with_defaults() -> Self {
        let mut config = Self::new();
        config.set("http.host", "127.0.0.1");
        config.set("http.port", "3000");
        config.set("errors.locale", Locale::default().tag());
        config.set("auth.jwt.issuer", "clinic");
        config.set("auth.jwt.ttl_seconds", "86400");
        config
    }

    /// Set a configuration key to a string value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Copy every variable starting with `prefix` into the store.
    ///
    /// `PREFIX__AUTH__JWT__SECRET` becomes `auth.jwt.secret`.
    pub fn load_env(&mut self, prefix: &str) {
        self.load_vars(prefix, std::env::vars());
    }

    pub fn load_vars<I>(&mut self, prefix: &str, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                let normalized = stripped.to_lowercase().replace("__", ".");
                if !normalized.is_empty() {
                    self.set(normalized, value);
                }
            }
        }
    }

    pub fn snapshot(&self) -> ClinicConfigSnapshot {
        ClinicConfigSnapshot::new(self.values.clone())
    }
}

/// Read-only view handed to the app builder.
#[derive(Debug, Clone, Default)]
pub struct ClinicConfigSnapshot {
    map: HashMap<String, String>,
}

impl ClinicConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    /// Parse a value, failing loudly when it is present but malformed.
    pub fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| ConfigError::Invalid {
                key: key.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    /// Message catalog for `errors.locale` (pt-BR when unset).
    pub fn message_catalog(&self) -> Result<MessageCatalog, ConfigError> {
        let locale = self.parse::<Locale>("errors.locale")?.unwrap_or_default();
        Ok(MessageCatalog::for_locale(locale))
    }
}
