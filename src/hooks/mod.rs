//! Typed dispatch hook points.
//!
//! # Data Flow
//! ```text
//! pipeline.handle()
//!     → before_dispatch hooks, in registration order
//!       (a hook may finalize the Reply; routing is then bypassed)
//!     → route dispatch
//!     → after_dispatch hooks (diagnostic only, cannot alter control flow)
//!
//! auth flows call AppContext::notify_login()
//!     → login hooks (login logging)
//! ```
//!
//! # Design Decisions
//! - Fixed hook signatures instead of a stringly-typed event bus; listeners
//!   are registered in explicit lists at startup
//! - Delivery is synchronous within the request task, in registration order;
//!   a slow hook blocks its request, nothing else
//! - No per-hook error isolation: a failing before-dispatch hook aborts the
//!   rest of the pipeline for that request

pub mod dispatch_log;
pub mod https_redirect;
pub mod login_log;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AppError;
use crate::http::request::RequestInfo;
use crate::http::response::Reply;
use crate::routing::DispatchOutcome;

/// Kind of login event, mirroring the platform's login audit categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginKind {
    Interactive,
    Cookie,
    FailedWrongPassword,
    Logout,
}

impl LoginKind {
    /// Whether the login log keeps a record for this kind.
    pub fn recorded(self) -> bool {
        matches!(
            self,
            LoginKind::Interactive | LoginKind::Cookie | LoginKind::FailedWrongPassword
        )
    }

    /// Stable numeric code stored in login records.
    pub fn code(self) -> i32 {
        match self {
            LoginKind::Interactive => 0,
            LoginKind::Cookie => 1,
            LoginKind::FailedWrongPassword => 2,
            LoginKind::Logout => 3,
        }
    }
}

/// Runs before routing; may finalize the reply to short-circuit dispatch.
#[async_trait]
pub trait BeforeDispatchHook: Send + Sync {
    async fn before_dispatch(
        &self,
        request: &RequestInfo,
        reply: &mut Reply,
    ) -> Result<(), AppError>;
}

/// Observes the dispatch outcome. Purely diagnostic.
#[async_trait]
pub trait AfterDispatchHook: Send + Sync {
    async fn after_dispatch(&self, request: &RequestInfo, outcome: &DispatchOutcome);
}

/// Notified when an authentication flow records a login attempt.
#[async_trait]
pub trait LoginHook: Send + Sync {
    async fn on_login(
        &self,
        request: &RequestInfo,
        kind: LoginKind,
        uid: i64,
    ) -> Result<(), AppError>;
}

/// All hook registrations, assembled once at startup.
#[derive(Default)]
pub struct HookSet {
    pub before_dispatch: Vec<Arc<dyn BeforeDispatchHook>>,
    pub after_dispatch: Vec<Arc<dyn AfterDispatchHook>>,
    pub login: Vec<Arc<dyn LoginHook>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_kinds() {
        assert!(LoginKind::Interactive.recorded());
        assert!(LoginKind::Cookie.recorded());
        assert!(LoginKind::FailedWrongPassword.recorded());
        assert!(!LoginKind::Logout.recorded());
    }
}
