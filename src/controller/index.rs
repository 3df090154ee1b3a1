//! Landing page controller.

use async_trait::async_trait;

use crate::controller::{Action, ActionContext, ActionOutcome};
use crate::error::AppError;

/// Serves the landing page. Template rendering lives in the templating
/// service; the dispatch layer only returns the body string.
pub struct HomeAction;

#[async_trait]
impl Action for HomeAction {
    async fn invoke(&self, _ctx: &mut ActionContext<'_>) -> Result<ActionOutcome, AppError> {
        Ok(ActionOutcome::Body(
            "<!DOCTYPE html><html><head><title>openvj</title></head>\
             <body><h1>openvj</h1></body></html>"
                .to_string(),
        ))
    }
}
