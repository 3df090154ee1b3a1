//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (method, path)
//!     → dispatcher.rs (scan rule table in registration order)
//!     → pattern.rs (segment-by-segment match, placeholder binding)
//!     → Return: Matched / NotFound / MethodNotAllowed
//!
//! Table compilation (at startup):
//!     RouteRuleConfig[]
//!     → parse path patterns (malformed pattern = fatal)
//!     → resolve controller:action against the registry (typo = fatal)
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime (lock-free sharing)
//! - First pattern match wins in registration order, independent of method
//! - Method mismatch on a matched pattern is MethodNotAllowed, not NotFound
//! - No regex; placeholders match exactly one non-empty path segment

pub mod dispatcher;
pub mod pattern;

pub use dispatcher::{DispatchOutcome, RouteTable, RouteTableError};
pub use pattern::{PathPattern, PatternError};
