//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_PASSWORD` - Shared back-office password
//!
//! ## Optional
//! - `STORE_URL` / `STORE_ANON_KEY` - Hosted table store; both or neither.
//!   Without them the in-process store is used.
//! - `STORE_POLL_INTERVAL_MS` - Change-feed poll interval (default: 2000)
//! - `STORE_ACTOR_BUFFER` - Store request queue length (default: 32)
//! - `CATALOG_FALLBACK` - `seed` or `off` (default: seed)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::app_system::DEFAULT_ACTOR_BUFFER;
use crate::product_actor::CatalogFallback;

const DEFAULT_POLL_INTERVAL_MS: &str = "2000";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Hosted table store endpoint.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    /// Publishable key sent as both `apikey` and bearer token.
    pub anon_key: SecretString,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` selects the in-process store.
    pub store: Option<StoreConfig>,
    pub admin_password: SecretString,
    pub poll_interval: Duration,
    pub actor_buffer: usize,
    pub catalog_fallback: CatalogFallback,
}

impl AppConfig {
    /// Load configuration from the process environment, reading `.env`
    /// first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let store = match (env.optional("STORE_URL"), env.optional("STORE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(StoreConfig {
                url,
                anon_key: SecretString::from(anon_key),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::MissingEnvVar("STORE_ANON_KEY".to_string())),
            (None, Some(_)) => return Err(ConfigError::MissingEnvVar("STORE_URL".to_string())),
        };

        let admin_password = SecretString::from(env.required("ADMIN_PASSWORD")?);

        let poll_interval_ms: u64 = env.parsed("STORE_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?;
        if poll_interval_ms == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "STORE_POLL_INTERVAL_MS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let actor_buffer: usize = env.parsed_or("STORE_ACTOR_BUFFER", DEFAULT_ACTOR_BUFFER)?;
        if actor_buffer == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "STORE_ACTOR_BUFFER".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let catalog_fallback = env.parsed("CATALOG_FALLBACK", "seed")?;

        Ok(Self {
            store,
            admin_password,
            poll_interval: Duration::from_millis(poll_interval_ms),
            actor_buffer,
            catalog_fallback,
        })
    }
}

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Unset and blank are the same thing.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key)
            .as_deref()
            .unwrap_or(default)
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            Some(value) => value
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
            None => Ok(default),
        }
    }
}
