//! Semantic configuration checks.
//!
//! Serde handles shape; this pass catches what types cannot: malformed
//! route patterns, impossible method lists, inconsistent HTTPS settings.
//! Any finding is fatal at startup.

use axum::http::Method;

use crate::config::schema::AppConfig;
use crate::routing::pattern::PathPattern;

/// One semantic finding, pointing at the offending setting.
#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    BadRoutePattern { path: String, reason: String },
    NoMethods { path: String },
    InvalidMethod { path: String, method: String },
    MalformedTarget { path: String, target: String },
    MissingCanonicalHost,
    ZeroSessionTtl,
    ZeroSessionPurgeInterval,
    EmptySessionCookieName,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::BadRoutePattern { path, reason } => {
                write!(f, "route {:?}: {}", path, reason)
            }
            ValidationError::NoMethods { path } => {
                write!(f, "route {:?} lists no methods", path)
            }
            ValidationError::InvalidMethod { path, method } => {
                write!(f, "route {:?}: invalid method {:?}", path, method)
            }
            ValidationError::MalformedTarget { path, target } => {
                write!(f, "route {:?}: target {:?} is not 'controller:action'", path, target)
            }
            ValidationError::MissingCanonicalHost => {
                write!(f, "http.enforce_https requires http.canonical_host")
            }
            ValidationError::ZeroSessionTtl => write!(f, "session.ttl_secs must be positive"),
            ValidationError::ZeroSessionPurgeInterval => {
                write!(f, "session.purge_interval_secs must be positive")
            }
            ValidationError::EmptySessionCookieName => {
                write!(f, "session.cookie_name must not be empty")
            }
        }
    }
}

/// Validate semantic constraints, collecting every finding.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.http.enforce_https && config.http.canonical_host.trim().is_empty() {
        errors.push(ValidationError::MissingCanonicalHost);
    }
    if config.session.ttl_secs == 0 {
        errors.push(ValidationError::ZeroSessionTtl);
    }
    if config.session.purge_interval_secs == 0 {
        errors.push(ValidationError::ZeroSessionPurgeInterval);
    }
    if config.session.cookie_name.trim().is_empty() {
        errors.push(ValidationError::EmptySessionCookieName);
    }

    for rule in &config.routes {
        if let Err(err) = PathPattern::parse(&rule.path) {
            errors.push(ValidationError::BadRoutePattern {
                path: rule.path.clone(),
                reason: err.to_string(),
            });
        }
        if rule.methods.is_empty() {
            errors.push(ValidationError::NoMethods {
                path: rule.path.clone(),
            });
        }
        for method in &rule.methods {
            if Method::from_bytes(method.as_bytes()).is_err() {
                errors.push(ValidationError::InvalidMethod {
                    path: rule.path.clone(),
                    method: method.clone(),
                });
            }
        }
        if !rule.controller.contains(':') {
            errors.push(ValidationError::MalformedTarget {
                path: rule.path.clone(),
                target: rule.controller.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
