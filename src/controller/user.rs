//! User session controller.

use async_trait::async_trait;
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use uuid::Uuid;

use crate::controller::{Action, ActionContext, ActionOutcome};
use crate::error::AppError;
use crate::hooks::LoginKind;
use crate::http::response::{CookieChange, Reply};
use crate::user::auth::AuthOutcome;
use crate::user::canonicalize_username;

/// Verifies submitted credentials, opens a session and notifies the login
/// hooks. Failed attempts against a known user are recorded too.
pub struct LoginAction;

#[async_trait]
impl Action for LoginAction {
    async fn invoke(&self, ctx: &mut ActionContext<'_>) -> Result<ActionOutcome, AppError> {
        let username = ctx.request.form_field("username").unwrap_or_default();
        let password = ctx.request.form_field("password").unwrap_or_default();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::user("username and password are required"));
        }

        let Some(auth) = &ctx.app.auth else {
            return Err(AppError::user("login is unavailable"));
        };

        let canonical = canonicalize_username(username);
        match auth.verify(&canonical, password).await? {
            AuthOutcome::Success { uid } => {
                ctx.app
                    .notify_login(ctx.request, LoginKind::Interactive, uid)
                    .await?;

                let session_id = Uuid::new_v4().to_string();
                let payload = serde_json::json!({ "uid": uid }).to_string();
                ctx.app.sessions.save(&session_id, payload.as_bytes()).await?;

                let mut reply = Reply::new();
                reply.set_status(StatusCode::FOUND);
                reply.header(LOCATION, "/");
                reply.set_cookie(CookieChange::Set {
                    name: ctx.app.config.session.cookie_name.clone(),
                    value: session_id,
                    max_age_secs: Some(ctx.app.config.session.ttl_secs),
                    http_only: true,
                });
                Ok(ActionOutcome::Replace(reply))
            }
            AuthOutcome::WrongPassword { uid } => {
                ctx.app
                    .notify_login(ctx.request, LoginKind::FailedWrongPassword, uid)
                    .await?;
                Err(AppError::user("incorrect username or password"))
            }
            // The uid is unknown, so there is nothing for the login log.
            AuthOutcome::UnknownUser => Err(AppError::user("incorrect username or password")),
        }
    }
}

/// Destroys the caller's server-side session and expires the session
/// cookie, then redirects to the landing page.
pub struct LogoutAction;

#[async_trait]
impl Action for LogoutAction {
    async fn invoke(&self, ctx: &mut ActionContext<'_>) -> Result<ActionOutcome, AppError> {
        let cookie_name = ctx.app.config.session.cookie_name.clone();
        if let Some(session_id) = ctx.request.cookie(&cookie_name) {
            ctx.app.sessions.destroy(session_id).await?;
        }

        let mut reply = Reply::new();
        reply.set_status(StatusCode::FOUND);
        reply.header(LOCATION, "/");
        reply.set_cookie(CookieChange::clear(cookie_name));
        Ok(ActionOutcome::Replace(reply))
    }
}
