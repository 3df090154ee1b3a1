//! HTTP server setup and error boundary.
//!
//! # Responsibilities
//! - Create the Axum router with trace/timeout layers
//! - Feed every request through the dispatch pipeline
//! - Map pipeline errors to responses at one boundary, with the logging
//!   taxonomy: expected errors rendered silently, faults logged, storage
//!   connectivity faults logged at escalated severity

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, Response, StatusCode};
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::error::AppError;
use crate::http::pipeline;
use crate::http::request::RequestInfo;
use crate::http::response::Reply;
use crate::observability::metrics;

/// HTTP server for the dispatch layer.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(app: Arc<AppContext>) -> Self {
        Self {
            router: build_router(app),
        }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router. Every path lands in the dispatch pipeline; Axum
/// only provides the listener plumbing, not the route matching.
pub fn build_router(app: Arc<AppContext>) -> Router {
    let request_timeout = Duration::from_secs(app.config.server.request_timeout_secs);
    Router::new()
        .route("/{*path}", any(dispatch_handler))
        .route("/", any(dispatch_handler))
        .with_state(app)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

async fn dispatch_handler(
    State(app): State<Arc<AppContext>>,
    request: Request<Body>,
) -> Response<Body> {
    let start = Instant::now();
    // Absent when the router is driven without a listener (tests).
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let request = RequestInfo::extract_with_peer(request, peer).await;

    tracing::debug!(
        request_id = %request.request_id(),
        method = %request.method(),
        path = %request.path(),
        "handling request"
    );

    let mut reply = Reply::new();
    let response = match pipeline::handle(&app, &request, &mut reply).await {
        Ok(()) => reply.into_http(&request),
        Err(err) => error_response(err, &request, reply),
    };

    metrics::record_dispatch(request.method().as_str(), response.status().as_u16(), start);
    response
}

/// The one place request errors become responses. Internal detail never
/// reaches the client; user errors are rendered verbatim and not logged.
/// Cookie mutations queued before the failure still apply: an opt-out
/// cookie set by a hook must survive a 404.
fn error_response(err: AppError, request: &RequestInfo, pending: Reply) -> Response<Body> {
    let (status, message) = match &err {
        AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
        AppError::User(message) => {
            tracing::debug!(request_id = %request.request_id(), message = %message, "user error");
            (StatusCode::BAD_REQUEST, message.clone())
        }
        AppError::Storage(source) => {
            tracing::error!(
                request_id = %request.request_id(),
                error = %source,
                alert = true,
                "storage failure while handling request"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            )
        }
        AppError::Internal(message) => {
            tracing::error!(
                request_id = %request.request_id(),
                error = %message,
                "unhandled fault while handling request"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            )
        }
    };

    let mut reply = Reply::new();
    for cookie in pending.cookies() {
        reply.set_cookie(cookie.clone());
    }
    reply.set_status(status);
    if request.accepts_json() {
        reply.header(CONTENT_TYPE, "application/json");
        reply.set_body(serde_json::json!({ "error": message }).to_string());
    } else if matches!(err, AppError::NotFound) {
        reply.header(CONTENT_TYPE, "text/html; charset=utf-8");
        reply.set_body(
            "<!DOCTYPE html><html><head><title>404</title></head>\
             <body><h1>404 Not Found</h1></body></html>"
                .to_string(),
        );
    } else {
        reply.header(CONTENT_TYPE, "text/plain; charset=utf-8");
        reply.set_body(message);
    }
    reply.send();
    reply.into_http(request)
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
