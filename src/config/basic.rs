use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::net::{IpAddr, Ipv4Addr};

/// Basic (core) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    /// HTTP server listen address (e.g., "0.0.0.0", "127.0.0.1").
    /// TOML: `basic.listen_addr`. Default: `0.0.0.0`.
    #[serde(default = "default_listen_ip")]
    pub listen_addr: IpAddr,

    /// HTTP server listen port.
    /// TOML: `basic.listen_port`. Default: `8080`.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Database URL for SQLite.
    /// TOML: `basic.database_url`. Default: `sqlite://mizar.db`.
    #[serde(default)]
    pub database_url: String,

    /// Connection pool size for the shared SQLite pool.
    /// TOML: `basic.db_max_connections`. Default: `5`.
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// TOML: `basic.loglevel`. Default: `info`.
    #[serde(default)]
    pub loglevel: String,

    /// Authentication key for inbound request validation (required, non-empty).
    /// TOML: `basic.api_key`. Must be provided.
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_string_lax")]
    pub api_key: String,

    /// Maximum accepted request body size in bytes.
    /// TOML: `basic.request_body_limit`. Default: 1 MiB.
    #[serde(default = "default_request_body_limit")]
    pub request_body_limit: usize,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_ip(),
            listen_port: default_listen_port(),
            database_url: "sqlite://mizar.db".to_string(),
            db_max_connections: default_db_max_connections(),
            loglevel: "info".to_string(),
            // No insecure default. `Config::from_sources()` enforces non-empty.
            api_key: "".to_string(),
            request_body_limit: default_request_body_limit(),
        }
    }
}

fn deserialize_string_lax<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(serde::de::Error::custom(
            "expected a string or a number for basic.api_key",
        )),
    }
}

/// Default IP address for the HTTP server listen address.
fn default_listen_ip() -> IpAddr {
    Ipv4Addr::new(0, 0, 0, 0).into()
}

/// Default port for the HTTP server.
fn default_listen_port() -> u16 {
    8080
}

fn default_db_max_connections() -> u32 {
    5
}

fn default_request_body_limit() -> usize {
    1024 * 1024
}
