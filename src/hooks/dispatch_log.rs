//! Post-dispatch diagnostic logging.

use async_trait::async_trait;

use crate::hooks::AfterDispatchHook;
use crate::http::request::RequestInfo;
use crate::routing::DispatchOutcome;

/// Logs every dispatch outcome with its request ID. Observational only.
pub struct DispatchLogService;

#[async_trait]
impl AfterDispatchHook for DispatchLogService {
    async fn after_dispatch(&self, request: &RequestInfo, outcome: &DispatchOutcome) {
        match outcome {
            DispatchOutcome::Matched { action, .. } => tracing::debug!(
                request_id = %request.request_id(),
                method = %request.method(),
                path = %request.path(),
                action = ?action,
                "route matched"
            ),
            DispatchOutcome::NotFound => tracing::debug!(
                request_id = %request.request_id(),
                method = %request.method(),
                path = %request.path(),
                "no route matched"
            ),
            DispatchOutcome::MethodNotAllowed => tracing::debug!(
                request_id = %request.request_id(),
                method = %request.method(),
                path = %request.path(),
                "route matched but method rejected"
            ),
        }
    }
}
