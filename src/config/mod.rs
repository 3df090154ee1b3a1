//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, route-pattern compilation)
//!     → AppConfig (validated, immutable)
//!     → shared read-only via AppContext
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults so a minimal config file works
//! - Route patterns are compiled during validation so malformed patterns
//!   fail startup, never a request

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, HttpConfig, MongoConfig, RouteRuleConfig, SessionConfig};
