//! Controller actions and their static registry.
//!
//! # Data Flow
//! ```text
//! config routing rule "user:logout"
//!     → registry.rs resolves to an ActionId at startup (typo = fatal)
//!     → RouteTable stores the ActionId
//!     → pipeline invokes the action with (request, reply, vars)
//!     → ActionOutcome tells the pipeline what to send
//! ```
//!
//! # Design Decisions
//! - No runtime class lookup by string; every action is registered in code
//!   and resolved once at startup
//! - Actions receive the shared mutable Reply and may finalize it themselves
//!   (streaming case) or hand a body / replacement reply back to the pipeline

pub mod index;
pub mod registry;
pub mod user;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::context::AppContext;
use crate::error::AppError;
use crate::http::request::RequestInfo;
use crate::http::response::Reply;

pub use registry::{ActionId, ControllerRegistry};

/// Per-invocation view handed to a controller action.
pub struct ActionContext<'a> {
    pub request: &'a RequestInfo,
    pub reply: &'a mut Reply,
    pub app: &'a AppContext,
    /// Path variables bound by the matched route pattern.
    pub vars: HashMap<String, String>,
}

impl ActionContext<'_> {
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

/// What an action hands back to the pipeline.
pub enum ActionOutcome {
    /// The action produced no return value. If it also did not finalize the
    /// reply, the pipeline sends the accumulated reply as-is.
    Empty,
    /// A body string; content type defaults to text/html (UTF-8) if unset.
    Body(String),
    /// A replacement reply that supersedes the pipeline's accumulator.
    Replace(Reply),
}

/// A controller action invokable by the dispatcher.
#[async_trait]
pub trait Action: Send + Sync {
    async fn invoke(&self, ctx: &mut ActionContext<'_>) -> Result<ActionOutcome, AppError>;
}
