//! Read-only per-request view.
//!
//! # Responsibilities
//! - Capture everything the pipeline and hooks may inspect: method, path,
//!   query, cookies, form fields, User-Agent, Host, scheme
//! - Assign a request ID as early as possible for tracing
//!
//! # Design Decisions
//! - Immutable within one dispatch cycle; the Reply is the only mutable
//!   request-scoped state
//! - HTTPS detection honors X-Forwarded-Proto so the decision works behind
//!   a TLS-terminating front server
//! - Form bodies are read eagerly with a hard size cap; anything else is
//!   left unread

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::body::Body;
use axum::http::header::{COOKIE, HOST, USER_AGENT};
use axum::http::{HeaderMap, Method, Request};
use uuid::Uuid;

/// Hard cap on urlencoded form bodies read by the dispatch layer.
const FORM_BODY_LIMIT: usize = 64 * 1024;

/// Immutable snapshot of an inbound request.
#[derive(Debug)]
pub struct RequestInfo {
    method: Method,
    path: String,
    request_uri: String,
    headers: HeaderMap,
    query: HashMap<String, String>,
    form: HashMap<String, String>,
    cookies: HashMap<String, String>,
    secure: bool,
    request_id: String,
    client_ip: Option<String>,
}

impl RequestInfo {
    /// Build the snapshot, consuming the request. Reads the body only for
    /// urlencoded forms within [`FORM_BODY_LIMIT`].
    pub async fn extract(request: Request<Body>) -> Self {
        Self::extract_with_peer(request, None).await
    }

    /// Like [`RequestInfo::extract`], with the peer address as the client
    /// IP fallback when no forwarding proxy supplied X-Forwarded-For.
    pub async fn extract_with_peer(request: Request<Body>, peer: Option<SocketAddr>) -> Self {
        let (parts, body) = request.into_parts();

        let path = parts.uri.path().to_string();
        let request_uri = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| path.clone());
        let query = parts
            .uri
            .query()
            .map(parse_urlencoded)
            .unwrap_or_default();

        let secure = parts.uri.scheme_str() == Some("https")
            || header_str(&parts.headers, "x-forwarded-proto")
                .map(|proto| proto.eq_ignore_ascii_case("https"))
                .unwrap_or(false);

        let request_id = header_str(&parts.headers, "x-request-id")
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let client_ip = header_str(&parts.headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(|ip| ip.trim().to_string())
            .or_else(|| peer.map(|addr| addr.ip().to_string()));

        let cookies = parse_cookie_header(&parts.headers);

        let form = if is_urlencoded_form(&parts.headers) {
            match axum::body::to_bytes(body, FORM_BODY_LIMIT).await {
                Ok(bytes) => parse_urlencoded(std::str::from_utf8(&bytes).unwrap_or("")),
                Err(err) => {
                    tracing::debug!(error = %err, "form body discarded");
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Self {
            method: parts.method,
            path,
            request_uri,
            headers: parts.headers,
            query,
            form,
            cookies,
            secure,
            request_id,
            client_ip,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// URL path with the query string stripped.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Original request URI including the query string.
    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn form_field(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(String::as_str)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// User-Agent header. Values that are not clean ASCII come back as
    /// `None`, which doubles as the sanitization the login log relies on.
    pub fn user_agent(&self) -> Option<&str> {
        header_str(&self.headers, USER_AGENT.as_str())
    }

    pub fn host(&self) -> Option<&str> {
        header_str(&self.headers, HOST.as_str())
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    /// True when the client asked for JSON. The error boundary uses this to
    /// pick a render format for API callers.
    pub fn accepts_json(&self) -> bool {
        header_str(&self.headers, "accept")
            .map(|accept| accept.contains("application/json"))
            .unwrap_or(false)
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn client_ip(&self) -> Option<&str> {
        self.client_ip.as_deref()
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn is_urlencoded_form(headers: &HeaderMap) -> bool {
    header_str(headers, "content-type")
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

fn parse_urlencoded(input: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(input.as_bytes())
        .into_owned()
        .collect()
}

fn parse_cookie_header(headers: &HeaderMap) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for value in headers.get_all(COOKIE) {
        let Ok(value) = value.to_str() else { continue };
        for pair in value.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                cookies.insert(name.trim().to_string(), value.trim().to_string());
            }
        }
    }
    cookies
}
