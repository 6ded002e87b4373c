//! # offsec-config
//!
//! Layered configuration loading for the offsec program tracker using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`OFFSEC_*` prefix, `__` as separator)
//! 2. Project-level `.offsec/config.toml`
//! 3. User-level `~/.config/offsec/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `OFFSEC_DATABASE__PATH` -> `database.path`,
//! `OFFSEC_AUTH__MODE` -> `auth.mode`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use offsec_config::OffsecConfig;
//!
//! let config = OffsecConfig::load_with_dotenv().expect("config");
//! config.validate().expect("valid config");
//! println!("serving on {}", config.server.bind_addr);
//! ```

mod auth;
mod database;
mod error;
mod server;

pub use auth::{AuthConfig, AuthMode};
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use server::ServerConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OffsecConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl OffsecConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` when a source fails to parse or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        // A missing .env is fine.
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so callers can layer extra providers (CLI flags) on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".offsec/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("OFFSEC_").split("__"))
    }

    /// Check values figment cannot type-check.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an empty database path, a zero
    /// busy timeout, or a bind address that is not a socket address.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::invalid("database.path", "must not be empty"));
        }
        if self.database.busy_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "database.busy_timeout_ms",
                "must be greater than zero",
            ));
        }
        self.server.socket_addr()?;
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("offsec").join("config.toml"))
    }
}
