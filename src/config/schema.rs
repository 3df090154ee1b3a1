//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! platform's bootstrap layer. All types derive Serde traits for
//! deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,

    /// HTTPS enforcement policy.
    pub http: HttpConfig,

    /// Session cookie and TTL settings.
    pub session: SessionConfig,

    /// Document database connection. When absent, the process runs with an
    /// in-memory session store and login logging disabled (development).
    pub mongodb: Option<MongoConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Ordered routing rules; registration order is matching order.
    pub routes: Vec<RouteRuleConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// HTTPS enforcement policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Redirect insecure browser requests to the canonical HTTPS origin.
    pub enforce_https: bool,

    /// Host used when building redirect targets (e.g., "openvj.org").
    pub canonical_host: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enforce_https: false,
            canonical_host: String::new(),
        }
    }
}

/// Session cookie and storage settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session cookie name.
    pub cookie_name: String,

    /// Session TTL in seconds.
    pub ttl_secs: u64,

    /// Interval between background sweeps of expired sessions, in seconds.
    pub purge_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "VJID".to_string(),
            ttl_secs: 30 * 24 * 3600,
            purge_interval_secs: 3600,
        }
    }
}

/// Document database connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MongoConfig {
    /// Connection string (e.g., "mongodb://localhost:27017").
    pub uri: String,

    /// Database name.
    pub database: String,

    /// Connection establishment timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_connect_timeout_ms() -> u64 {
    3_000
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// One routing rule: methods + path pattern + `controller:action` target.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteRuleConfig {
    /// Accepted HTTP methods, case-sensitive as registered.
    pub methods: Vec<String>,

    /// Path pattern with literal segments and `{name}` placeholders.
    pub path: String,

    /// Target in `controller:action` form.
    pub controller: String,
}
