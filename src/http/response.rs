//! Outbound reply accumulator.
//!
//! # Responsibilities
//! - Accumulate status, headers, cookies and body across hooks and the
//!   controller action
//! - Enforce the send-at-most-once invariant via the `sent` flag
//! - Finalize against the request (HEAD and bodyless statuses drop the body)
//!
//! # Design Decisions
//! - `send()` only marks the reply finalized; the actual bytes leave in
//!   `into_http` at the server boundary, so finalization stays testable
//! - Collaborators must check `is_sent()` before mutating further

use axum::body::Body;
use axum::http::header::{HeaderName, HeaderValue, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, Method, Response, StatusCode};

use crate::http::request::RequestInfo;

/// A pending cookie mutation, rendered as a Set-Cookie header on send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieChange {
    Set {
        name: String,
        value: String,
        /// `None` is a session-length cookie (no Expires/Max-Age attribute).
        max_age_secs: Option<u64>,
        http_only: bool,
    },
    Clear {
        name: String,
    },
}

impl CookieChange {
    /// Session-length HTTP-only cookie.
    pub fn session(name: impl Into<String>, value: impl Into<String>) -> Self {
        CookieChange::Set {
            name: name.into(),
            value: value.into(),
            max_age_secs: None,
            http_only: true,
        }
    }

    pub fn clear(name: impl Into<String>) -> Self {
        CookieChange::Clear { name: name.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            CookieChange::Set { name, .. } | CookieChange::Clear { name } => name,
        }
    }

    fn to_set_cookie(&self) -> String {
        match self {
            CookieChange::Set {
                name,
                value,
                max_age_secs,
                http_only,
            } => {
                let mut rendered = format!("{}={}; Path=/", name, value);
                if let Some(secs) = max_age_secs {
                    rendered.push_str(&format!("; Max-Age={}", secs));
                }
                if *http_only {
                    rendered.push_str("; HttpOnly");
                }
                rendered
            }
            CookieChange::Clear { name } => format!(
                "{}=deleted; Path=/; Expires=Thu, 01 Jan 1970 00:00:01 GMT; Max-Age=0; HttpOnly",
                name
            ),
        }
    }
}

/// Mutable response accumulator for one request.
#[derive(Debug, Default)]
pub struct Reply {
    status: Option<StatusCode>,
    headers: HeaderMap,
    cookies: Vec<CookieChange>,
    body: Option<String>,
    sent: bool,
}

impl Reply {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    pub fn header(&mut self, name: HeaderName, value: &str) {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name, value);
            }
            Err(_) => tracing::warn!(header = %name, "dropping unencodable header value"),
        }
    }

    pub fn header_if_unset(&mut self, name: HeaderName, value: &str) {
        if !self.headers.contains_key(&name) {
            self.header(name, value);
        }
    }

    pub fn get_header(&self, name: HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Queue a cookie mutation, superseding any earlier one for the name.
    pub fn set_cookie(&mut self, change: CookieChange) {
        self.cookies.retain(|c| c.name() != change.name());
        self.cookies.push(change);
    }

    pub fn cookies(&self) -> &[CookieChange] {
        &self.cookies
    }

    pub fn set_body(&mut self, body: String) {
        self.body = Some(body);
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Set Location and a 302 status for a redirect. Callers that want the
    /// redirect to preempt routing must also call [`Reply::send`].
    pub fn redirect(&mut self, location: &str) {
        self.set_status(StatusCode::FOUND);
        self.header(LOCATION, location);
    }

    /// Mark the reply finalized. Further sends are no-ops; collaborators
    /// check [`Reply::is_sent`] before mutating.
    pub fn send(&mut self) {
        self.sent = true;
    }

    pub fn is_sent(&self) -> bool {
        self.sent
    }

    /// Finalize into the wire response, adjusting for HTTP semantics: HEAD
    /// and bodyless statuses carry no payload, cookies become Set-Cookie
    /// headers, and the request ID is echoed back.
    pub fn into_http(self, request: &RequestInfo) -> Response<Body> {
        let status = self.status();
        let drop_body = request.method() == &Method::HEAD
            || status == StatusCode::NO_CONTENT
            || status == StatusCode::NOT_MODIFIED;
        let payload = if drop_body {
            String::new()
        } else {
            self.body.unwrap_or_default()
        };

        let mut headers = self.headers;
        for cookie in &self.cookies {
            if let Ok(value) = HeaderValue::from_str(&cookie.to_set_cookie()) {
                headers.append(SET_COOKIE, value);
            }
        }
        if let Ok(value) = HeaderValue::from_str(request.request_id()) {
            headers.insert(HeaderName::from_static("x-request-id"), value);
        }

        let mut response = Response::new(Body::from(payload));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}
