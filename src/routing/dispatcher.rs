//! Route table and dispatch.
//!
//! # Responsibilities
//! - Compile configured rules into an immutable table at startup
//! - Map (method, path) to a registered controller action
//! - Report NotFound / MethodNotAllowed explicitly
//!
//! # Design Decisions
//! - The table is built once and shared read-only across requests
//! - First pattern match wins in registration order, independent of the
//!   method; other rules with the same pattern text are then consulted
//!   for the method before giving up with MethodNotAllowed
//! - Method comparison is case-sensitive as registered

use std::collections::HashMap;

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::RouteRuleConfig;
use crate::controller::{ActionId, ControllerRegistry};
use crate::routing::pattern::{PathPattern, PatternError};

/// Outcome of matching a request against the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A rule matched and accepts the method.
    Matched {
        action: ActionId,
        vars: HashMap<String, String>,
    },
    /// No pattern matched the path.
    NotFound,
    /// A pattern matched the path but no rule for it accepts the method.
    MethodNotAllowed,
}

/// Fatal table-construction error. Startup refuses to proceed on any of
/// these; a typo in routing config must never surface at request time.
#[derive(Debug, Error)]
pub enum RouteTableError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("rule for {pattern:?} lists no methods")]
    NoMethods { pattern: String },
    #[error("rule for {pattern:?}: invalid method {method:?}")]
    InvalidMethod { pattern: String, method: String },
    #[error("rule for {pattern:?}: target {target:?} is not 'controller:action'")]
    MalformedTarget { pattern: String, target: String },
    #[error("rule for {pattern:?}: no controller action registered for {target:?}")]
    UnknownTarget { pattern: String, target: String },
}

#[derive(Debug)]
struct RouteEntry {
    pattern: PathPattern,
    methods: Vec<Method>,
    action: ActionId,
}

/// Immutable, startup-built mapping from (method, path) to controller
/// actions. Safe to share across request tasks without locks.
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Compile the configured rules, resolving every `controller:action`
    /// target against the registry so unknown targets fail startup.
    pub fn build(
        rules: &[RouteRuleConfig],
        registry: &ControllerRegistry,
    ) -> Result<Self, RouteTableError> {
        let mut entries = Vec::with_capacity(rules.len());
        for rule in rules {
            let pattern = PathPattern::parse(&rule.path)?;

            if rule.methods.is_empty() {
                return Err(RouteTableError::NoMethods {
                    pattern: rule.path.clone(),
                });
            }
            let mut methods = Vec::with_capacity(rule.methods.len());
            for method in &rule.methods {
                let parsed = Method::from_bytes(method.as_bytes()).map_err(|_| {
                    RouteTableError::InvalidMethod {
                        pattern: rule.path.clone(),
                        method: method.clone(),
                    }
                })?;
                methods.push(parsed);
            }

            let (controller, action_name) = rule.controller.split_once(':').ok_or_else(|| {
                RouteTableError::MalformedTarget {
                    pattern: rule.path.clone(),
                    target: rule.controller.clone(),
                }
            })?;
            let action = registry
                .resolve(&controller.to_lowercase(), action_name)
                .ok_or_else(|| RouteTableError::UnknownTarget {
                    pattern: rule.path.clone(),
                    target: rule.controller.clone(),
                })?;

            entries.push(RouteEntry {
                pattern,
                methods,
                action,
            });
        }
        Ok(Self { entries })
    }

    /// Match a request. `path` is the URL path with the query stripped.
    pub fn dispatch(&self, method: &Method, path: &str) -> DispatchOutcome {
        let mut matched_pattern: Option<&str> = None;
        let mut matched_vars: Option<HashMap<String, String>> = None;

        for entry in &self.entries {
            match matched_pattern {
                Some(raw) => {
                    // A pattern already matched; only rules sharing its exact
                    // text may still claim the request for another method.
                    if entry.pattern.raw() == raw && entry.methods.contains(method) {
                        return DispatchOutcome::Matched {
                            action: entry.action,
                            vars: matched_vars.take().unwrap_or_default(),
                        };
                    }
                }
                None => {
                    if let Some(vars) = entry.pattern.match_path(path) {
                        if entry.methods.contains(method) {
                            return DispatchOutcome::Matched {
                                action: entry.action,
                                vars,
                            };
                        }
                        matched_pattern = Some(entry.pattern.raw());
                        matched_vars = Some(vars);
                    }
                }
            }
        }

        if matched_pattern.is_some() {
            DispatchOutcome::MethodNotAllowed
        } else {
            DispatchOutcome::NotFound
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
