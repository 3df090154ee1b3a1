//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace/timeout layers, error boundary)
//!     → request.rs (read-only per-request view, request ID)
//!     → pipeline.rs (hooks → dispatch → controller → finalize)
//!     → response.rs (Reply accumulator, sent exactly once)
//!     → Send to client
//! ```

pub mod pipeline;
pub mod request;
pub mod response;
pub mod server;

pub use request::RequestInfo;
pub use response::{CookieChange, Reply};
pub use server::HttpServer;
