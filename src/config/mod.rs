mod basic;

pub use basic::BasicConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::LazyLock};

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Environment variables override file values: `MIZAR_BASIC__API_KEY`,
/// `MIZAR_BASIC__DATABASE_URL`, ...
const ENV_PREFIX: &str = "MIZAR_";

impl Config {
    /// Builds a Figment that merges defaults, a config TOML file, and the
    /// process environment (highest precedence).
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration without validating required fields.
    ///
    /// Note: this does **not** validate required fields like `basic.api_key`. Binaries should
    /// call `Config::from_sources()` instead (or validate explicitly) to avoid running with
    /// insecure defaults.
    pub fn from_optional_sources() -> Self {
        Self::figment().extract().unwrap_or_else(|err| {
            panic!("failed to extract configuration (defaults + optional config.toml + env): {err}")
        })
    }

    /// Loads configuration from all sources and validates required fields.
    ///
    /// A missing required value is a startup-fatal error, never a runtime one.
    pub fn from_sources() -> Self {
        let cfg: Self = Self::figment().extract().unwrap_or_else(|err| {
            panic!("failed to extract configuration: {err}")
        });
        if cfg.basic.api_key.trim().is_empty() {
            panic!("basic.api_key must be set and non-empty (config.toml or MIZAR_BASIC__API_KEY)");
        }
        if cfg.basic.database_url.trim().is_empty() {
            panic!("basic.database_url must be set and non-empty");
        }
        cfg
    }
}

/// Global, lazily-initialized configuration instance.
pub static CONFIG: LazyLock<Config> = LazyLock::new(Config::from_optional_sources);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable_without_sources() {
        let cfg = Config::default();
        assert_eq!(cfg.basic.listen_port, 8080);
        assert_eq!(cfg.basic.database_url, "sqlite://mizar.db");
        assert_eq!(cfg.basic.db_max_connections, 5);
        assert_eq!(cfg.basic.loglevel, "info");
        assert!(cfg.basic.api_key.is_empty());
    }

    #[test]
    fn api_key_accepts_a_numeric_toml_value() {
        let cfg: Config = figment::Figment::new()
            .merge(figment::providers::Serialized::defaults(Config::default()))
            .merge(figment::providers::Toml::string("[basic]\napi_key = 123456"))
            .extract()
            .unwrap();
        assert_eq!(cfg.basic.api_key, "123456");
    }
}
