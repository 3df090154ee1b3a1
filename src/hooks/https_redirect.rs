//! HTTPS enforcement.
//!
//! # Responsibilities
//! - Classify the client as browser or crawler from the User-Agent
//! - Honor the `nossl` opt-out signal (query parameter beats cookie)
//! - Decide whether to redirect an insecure request to the canonical
//!   HTTPS origin
//!
//! # Design Decisions
//! - `decide` is a pure function over the request snapshot; the hook
//!   applies its cookie operation and redirect to the Reply
//! - Crawlers are never redirected, in either direction, so indexed HTTP
//!   URLs keep resolving for them

use async_trait::async_trait;

use crate::error::AppError;
use crate::hooks::BeforeDispatchHook;
use crate::http::request::RequestInfo;
use crate::http::response::{CookieChange, Reply};

/// Known crawler signatures, matched case-insensitively as substrings.
const SPIDER_SIGNATURES: &[&str] = &["googlebot", "baiduspider", "sogou web spider"];

/// Name of the opt-out query parameter and cookie.
const NOSSL: &str = "nossl";

/// True when the User-Agent carries a known crawler signature. A missing
/// or unrecognized User-Agent counts as a browser.
pub fn is_spider(user_agent: Option<&str>) -> bool {
    match user_agent {
        Some(ua) => {
            let ua = ua.to_lowercase();
            SPIDER_SIGNATURES.iter().any(|sig| ua.contains(sig))
        }
        None => false,
    }
}

/// Cookie operation attached to a redirect decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieOp {
    None,
    /// Persist the opt-out as a session-length cookie.
    SetOptOut,
    /// Delete the opt-out cookie.
    ClearOptOut,
}

/// Outcome of the enforcement decision. Derived per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectDecision {
    /// Absolute HTTPS target, present only when a redirect is required.
    pub redirect_to: Option<String>,
    pub cookie_op: CookieOp,
}

impl RedirectDecision {
    fn pass(cookie_op: CookieOp) -> Self {
        Self {
            redirect_to: None,
            cookie_op,
        }
    }
}

/// Map request attributes to a redirect/cookie decision. Pure; applying
/// the decision to the actual reply is the caller's job.
///
/// The `nossl` query parameter takes precedence over the cookie. `on`
/// suppresses enforcement (persisting a cookie only when it arrived via
/// the query); any other query value clears the cookie and falls through
/// to the enforcement rule.
pub fn decide(request: &RequestInfo, enforce_https: bool, canonical_host: &str) -> RedirectDecision {
    let mut cookie_op = CookieOp::None;

    match (request.query_param(NOSSL), request.cookie(NOSSL)) {
        (Some("on"), _) => return RedirectDecision::pass(CookieOp::SetOptOut),
        (Some(_), _) => cookie_op = CookieOp::ClearOptOut,
        (None, Some("on")) => return RedirectDecision::pass(CookieOp::None),
        (None, _) => {}
    }

    let enforced = enforce_https && !request.secure() && !is_spider(request.user_agent());
    RedirectDecision {
        redirect_to: enforced
            .then(|| format!("https://{}{}", canonical_host, request.request_uri())),
        cookie_op,
    }
}

/// Before-dispatch hook applying the enforcement decision.
pub struct HttpsRedirectionService {
    enforce_https: bool,
    canonical_host: String,
}

impl HttpsRedirectionService {
    pub fn new(enforce_https: bool, canonical_host: impl Into<String>) -> Self {
        Self {
            enforce_https,
            canonical_host: canonical_host.into(),
        }
    }
}

#[async_trait]
impl BeforeDispatchHook for HttpsRedirectionService {
    async fn before_dispatch(
        &self,
        request: &RequestInfo,
        reply: &mut Reply,
    ) -> Result<(), AppError> {
        let decision = decide(request, self.enforce_https, &self.canonical_host);

        match decision.cookie_op {
            CookieOp::SetOptOut => reply.set_cookie(CookieChange::session(NOSSL, "on")),
            CookieOp::ClearOptOut => reply.set_cookie(CookieChange::clear(NOSSL)),
            CookieOp::None => {}
        }

        if let Some(target) = decision.redirect_to {
            tracing::debug!(request_id = %request.request_id(), location = %target, "redirecting to https");
            reply.redirect(&target);
            reply.send();
        }
        Ok(())
    }
}
