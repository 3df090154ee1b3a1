//! End-to-end dispatch tests against the real router stack.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use openvj::config::schema::{AppConfig, RouteRuleConfig};
use openvj::context::AppContext;
use openvj::http::server::build_router;

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/537.17 \
                          (KHTML, like Gecko) Chrome/24.0.1312.57 Safari/537.17";
const SPIDER_UA: &str = "Sogou web spider/4.0";

fn rule(methods: &[&str], path: &str, controller: &str) -> RouteRuleConfig {
    RouteRuleConfig {
        methods: methods.iter().map(|m| m.to_string()).collect(),
        path: path.to_string(),
        controller: controller.to_string(),
    }
}

async fn router(enforce_https: bool) -> Router {
    let mut config = AppConfig::default();
    config.http.enforce_https = enforce_https;
    config.http.canonical_host = "openvj.org".to_string();
    config.routes = vec![
        rule(&["GET", "HEAD"], "/", "index:home"),
        rule(&["POST"], "/user/logout", "user:logout"),
    ];
    let app = AppContext::bootstrap(config).await.unwrap();
    build_router(Arc::new(app))
}

fn get(uri: &str, ua: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::USER_AGENT, ua)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_home_page_served_with_defaults() {
    let response = router(false).await.oneshot(get("/", BROWSER_UA)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/html; charset=utf-8"
    );
    assert!(response.headers().contains_key("x-request-id"));
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    assert!(std::str::from_utf8(&body).unwrap().contains("openvj"));
}

#[tokio::test]
async fn test_unknown_path_renders_404() {
    let response = router(false).await.oneshot(get("/unknown", BROWSER_UA)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_path_renders_json_for_api_clients() {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/unknown")
        .header(header::ACCEPT, "application/json")
        .body(Body::empty())
        .unwrap();
    let response = router(false).await.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["error"], "Not Found");
}

#[tokio::test]
async fn test_method_mismatch_renders_404() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .body(Body::empty())
        .unwrap();
    let response = router(false).await.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_head_request_has_empty_body() {
    let request = Request::builder()
        .method(Method::HEAD)
        .uri("/")
        .body(Body::empty())
        .unwrap();
    let response = router(false).await.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_browser_redirected_to_https_before_routing() {
    let response = router(true)
        .await
        .oneshot(get("/unknown?tab=1", BROWSER_UA))
        .await
        .unwrap();
    // The redirect preempts routing: no 404 even though /unknown has no rule.
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://openvj.org/unknown?tab=1"
    );
}

#[tokio::test]
async fn test_spider_not_redirected() {
    let response = router(true).await.oneshot(get("/", SPIDER_UA)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_nossl_opt_out_sets_cookie_and_serves_page() {
    let response = router(true)
        .await
        .oneshot(get("/?nossl=on", BROWSER_UA))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("nossl=on"));
    assert!(!cookie.contains("Max-Age"));
}

#[tokio::test]
async fn test_opt_out_cookie_survives_404() {
    let response = router(true)
        .await
        .oneshot(get("/unknown?nossl=on", BROWSER_UA))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("nossl=on"));
}

#[tokio::test]
async fn test_logout_clears_session_cookie() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/user/logout")
        .header(header::COOKIE, "VJID=sid123")
        .body(Body::empty())
        .unwrap();
    let response = router(false).await.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("VJID=deleted"));
}
