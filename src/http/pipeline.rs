//! Request pipeline: hooks, dispatch, controller invocation, finalization.
//!
//! # Responsibilities
//! - Run before-dispatch hooks; a hook that finalizes the reply is the only
//!   way routing can be bypassed
//! - Consult the route table and after-dispatch hooks
//! - Invoke the matched controller action and normalize its return value
//!
//! # Design Decisions
//! - Routing misses surface as `AppError::NotFound`; the boundary handler
//!   renders them, the pipeline never sends error responses itself
//! - An action that returns nothing and sends nothing leaves the reply
//!   untouched (it either streamed its own output or meant to stay silent)

use axum::http::header::CONTENT_TYPE;

use crate::context::AppContext;
use crate::controller::{ActionContext, ActionOutcome};
use crate::error::AppError;
use crate::http::request::RequestInfo;
use crate::http::response::Reply;
use crate::routing::DispatchOutcome;

/// Drive one request through hooks, dispatch and the controller action.
/// On `Ok`, the reply holds whatever should be sent; on `Err`, the boundary
/// renders the error.
pub async fn handle(
    app: &AppContext,
    request: &RequestInfo,
    reply: &mut Reply,
) -> Result<(), AppError> {
    for hook in &app.hooks.before_dispatch {
        hook.before_dispatch(request, reply).await?;
    }
    if reply.is_sent() {
        return Ok(());
    }

    let outcome = app.routes.dispatch(request.method(), request.path());

    for hook in &app.hooks.after_dispatch {
        hook.after_dispatch(request, &outcome).await;
    }
    if reply.is_sent() {
        return Ok(());
    }

    match outcome {
        DispatchOutcome::NotFound | DispatchOutcome::MethodNotAllowed => Err(AppError::NotFound),
        DispatchOutcome::Matched { action, vars } => {
            let handler = app.registry.handler(action);
            tracing::debug!(
                request_id = %request.request_id(),
                handler = %app.registry.target_name(action),
                "invoking controller action"
            );

            let mut ctx = ActionContext {
                request,
                reply,
                app,
                vars,
            };
            let returned = handler.invoke(&mut ctx).await?;

            if reply.is_sent() {
                return Ok(());
            }
            match returned {
                ActionOutcome::Empty => return Ok(()),
                ActionOutcome::Replace(replacement) => {
                    *reply = replacement;
                }
                ActionOutcome::Body(body) => {
                    reply.set_body(body);
                    reply.header_if_unset(CONTENT_TYPE, "text/html; charset=utf-8");
                }
            }
            reply.send();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::header::{CONTENT_TYPE, LOCATION, SET_COOKIE};
    use axum::http::{Method, Request, StatusCode};

    use crate::config::schema::{AppConfig, RouteRuleConfig};
    use crate::controller::ControllerRegistry;
    use crate::hooks::{BeforeDispatchHook, HookSet, LoginHook, LoginKind};
    use crate::http::response::CookieChange;
    use crate::routing::RouteTable;
    use crate::session::{MemorySessionStore, SessionStore};
    use crate::user::auth::{AuthOutcome, Authenticator};

    fn rule(methods: &[&str], path: &str, controller: &str) -> RouteRuleConfig {
        RouteRuleConfig {
            methods: methods.iter().map(|m| m.to_string()).collect(),
            path: path.to_string(),
            controller: controller.to_string(),
        }
    }

    fn test_app(rules: &[RouteRuleConfig], hooks: HookSet) -> AppContext {
        let registry = ControllerRegistry::builtin();
        let routes = RouteTable::build(rules, &registry).unwrap();
        AppContext {
            config: AppConfig::default(),
            routes,
            registry,
            hooks,
            sessions: Arc::new(MemorySessionStore::new(Duration::from_secs(60))),
            auth: None,
            storage: None,
        }
    }

    async fn request(method: Method, uri: &str) -> RequestInfo {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        RequestInfo::extract(req).await
    }

    struct TeapotHook;

    #[async_trait]
    impl BeforeDispatchHook for TeapotHook {
        async fn before_dispatch(
            &self,
            _request: &RequestInfo,
            reply: &mut Reply,
        ) -> Result<(), AppError> {
            reply.set_status(StatusCode::IM_A_TEAPOT);
            reply.send();
            Ok(())
        }
    }

    /// Knows exactly one user: alice / secret, uid 42.
    struct SingleUserAuthenticator;

    #[async_trait]
    impl Authenticator for SingleUserAuthenticator {
        async fn verify(&self, username: &str, password: &str) -> Result<AuthOutcome, AppError> {
            if username != "alice" {
                return Ok(AuthOutcome::UnknownUser);
            }
            if password == "secret" {
                Ok(AuthOutcome::Success { uid: 42 })
            } else {
                Ok(AuthOutcome::WrongPassword { uid: 42 })
            }
        }
    }

    #[derive(Default)]
    struct RecordingLoginHook {
        seen: Mutex<Vec<(LoginKind, i64)>>,
    }

    #[async_trait]
    impl LoginHook for RecordingLoginHook {
        async fn on_login(
            &self,
            _request: &RequestInfo,
            kind: LoginKind,
            uid: i64,
        ) -> Result<(), AppError> {
            self.seen.lock().unwrap().push((kind, uid));
            Ok(())
        }
    }

    async fn login_request(body: &str) -> RequestInfo {
        RequestInfo::extract(
            Request::builder()
                .method(Method::POST)
                .uri("/user/login")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    struct FailingHook;

    #[async_trait]
    impl BeforeDispatchHook for FailingHook {
        async fn before_dispatch(
            &self,
            _request: &RequestInfo,
            _reply: &mut Reply,
        ) -> Result<(), AppError> {
            Err(AppError::internal("hook exploded"))
        }
    }

    #[tokio::test]
    async fn test_matched_action_body_gets_html_default() {
        let app = test_app(&[rule(&["GET"], "/", "index:home")], HookSet::default());
        let req = request(Method::GET, "/").await;
        let mut reply = Reply::new();
        handle(&app, &req, &mut reply).await.unwrap();
        assert!(reply.is_sent());
        assert_eq!(reply.status(), StatusCode::OK);
        assert_eq!(
            reply.get_header(CONTENT_TYPE),
            Some("text/html; charset=utf-8")
        );
        assert!(reply.body().unwrap().contains("openvj"));
    }

    #[tokio::test]
    async fn test_unmatched_path_raises_not_found() {
        let app = test_app(&[rule(&["GET"], "/", "index:home")], HookSet::default());
        let req = request(Method::GET, "/unknown").await;
        let mut reply = Reply::new();
        let err = handle(&app, &req, &mut reply).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
        assert!(!reply.is_sent());
    }

    #[tokio::test]
    async fn test_method_mismatch_raises_not_found() {
        let app = test_app(&[rule(&["GET"], "/", "index:home")], HookSet::default());
        let req = request(Method::POST, "/").await;
        let err = handle(&app, &req, &mut Reply::new()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn test_finalizing_hook_bypasses_routing() {
        let mut hooks = HookSet::default();
        hooks.before_dispatch.push(Arc::new(TeapotHook));
        // No route for /unknown, yet the hook's reply wins.
        let app = test_app(&[], hooks);
        let req = request(Method::GET, "/unknown").await;
        let mut reply = Reply::new();
        handle(&app, &req, &mut reply).await.unwrap();
        assert_eq!(reply.status(), StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn test_failing_hook_aborts_pipeline() {
        let mut hooks = HookSet::default();
        hooks.before_dispatch.push(Arc::new(FailingHook));
        let app = test_app(&[rule(&["GET"], "/", "index:home")], hooks);
        let req = request(Method::GET, "/").await;
        let mut reply = Reply::new();
        let err = handle(&app, &req, &mut reply).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(!reply.is_sent());
    }

    #[tokio::test]
    async fn test_login_opens_session_and_records_interactive_login() {
        let hook = Arc::new(RecordingLoginHook::default());
        let mut hooks = HookSet::default();
        hooks.login.push(hook.clone());
        let mut app = test_app(&[rule(&["POST"], "/user/login", "user:login")], hooks);
        app.auth = Some(Arc::new(SingleUserAuthenticator));

        // Raw username exercises canonicalization on the way in.
        let req = login_request("username=Alice&password=secret").await;
        let mut reply = Reply::new();
        handle(&app, &req, &mut reply).await.unwrap();

        assert!(reply.is_sent());
        assert_eq!(reply.status(), StatusCode::FOUND);
        assert_eq!(reply.get_header(LOCATION), Some("/"));
        assert_eq!(
            *hook.seen.lock().unwrap(),
            vec![(LoginKind::Interactive, 42)]
        );

        let CookieChange::Set {
            name,
            value,
            max_age_secs,
            ..
        } = &reply.cookies()[0]
        else {
            panic!("expected a session cookie, got {:?}", reply.cookies());
        };
        assert_eq!(name, "VJID");
        assert!(max_age_secs.is_some());
        let payload = app.sessions.load(value).await.unwrap().unwrap();
        assert!(String::from_utf8(payload).unwrap().contains("42"));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_recorded_and_rejected() {
        let hook = Arc::new(RecordingLoginHook::default());
        let mut hooks = HookSet::default();
        hooks.login.push(hook.clone());
        let mut app = test_app(&[rule(&["POST"], "/user/login", "user:login")], hooks);
        app.auth = Some(Arc::new(SingleUserAuthenticator));

        let req = login_request("username=alice&password=wrong").await;
        let err = handle(&app, &req, &mut Reply::new()).await.unwrap_err();
        assert!(matches!(err, AppError::User(_)));
        assert_eq!(
            *hook.seen.lock().unwrap(),
            vec![(LoginKind::FailedWrongPassword, 42)]
        );
    }

    #[tokio::test]
    async fn test_login_unknown_user_leaves_no_record() {
        let hook = Arc::new(RecordingLoginHook::default());
        let mut hooks = HookSet::default();
        hooks.login.push(hook.clone());
        let mut app = test_app(&[rule(&["POST"], "/user/login", "user:login")], hooks);
        app.auth = Some(Arc::new(SingleUserAuthenticator));

        let req = login_request("username=nobody&password=secret").await;
        let err = handle(&app, &req, &mut Reply::new()).await.unwrap_err();
        assert!(matches!(err, AppError::User(_)));
        assert!(hook.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let mut app = test_app(
            &[rule(&["POST"], "/user/login", "user:login")],
            HookSet::default(),
        );
        app.auth = Some(Arc::new(SingleUserAuthenticator));

        let req = login_request("username=alice").await;
        let err = handle(&app, &req, &mut Reply::new()).await.unwrap_err();
        assert!(matches!(err, AppError::User(_)));
    }

    #[tokio::test]
    async fn test_logout_replaces_reply_and_destroys_session() {
        let app = test_app(&[rule(&["POST"], "/logout", "user:logout")], HookSet::default());
        app.sessions.save("sid123", b"payload").await.unwrap();

        let req = RequestInfo::extract(
            Request::builder()
                .method(Method::POST)
                .uri("/logout")
                .header("cookie", "VJID=sid123")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        let mut reply = Reply::new();
        handle(&app, &req, &mut reply).await.unwrap();

        assert!(reply.is_sent());
        assert_eq!(reply.status(), StatusCode::FOUND);
        assert_eq!(reply.get_header(LOCATION), Some("/"));
        assert_eq!(reply.cookies(), &[CookieChange::clear("VJID")]);
        assert_eq!(app.sessions.load("sid123").await.unwrap(), None);
        // Replacement replies skip the html default.
        let response = reply.into_http(&req);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
        assert!(response.headers().get(SET_COOKIE).is_some());
    }
}
