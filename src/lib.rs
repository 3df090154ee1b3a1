//! openvj bootstrap and request-dispatch layer.
//!
//! Wires configuration, structured logging, MongoDB-backed session storage,
//! an immutable route table and the typed dispatch hooks, then forwards each
//! request through the pipeline to a statically registered controller action.

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;

// Application wiring
pub mod context;
pub mod controller;
pub mod hooks;

// Persistence
pub mod session;
pub mod storage;

// Cross-cutting concerns
pub mod error;
pub mod observability;

// Domain helpers
pub mod user;
pub mod vote;

pub use config::schema::AppConfig;
pub use context::AppContext;
pub use error::AppError;
pub use http::HttpServer;
