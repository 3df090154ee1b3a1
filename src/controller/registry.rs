//! Static controller/action registry.
//!
//! Replaces runtime construction of controller classes by name: every
//! `controller:action` pair is registered here at startup, and the route
//! table refuses to build when a configured target is missing.

use std::sync::Arc;

use crate::controller::index::HomeAction;
use crate::controller::user::{LoginAction, LogoutAction};
use crate::controller::Action;

/// Opaque handle to a registered action, stored in the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId(usize);

impl ActionId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }
}

struct RegisteredAction {
    controller: String,
    action: String,
    handler: Arc<dyn Action>,
}

/// Lookup table from (controller, action) identifiers to handlers.
/// Built once at startup; immutable afterwards.
#[derive(Default)]
pub struct ControllerRegistry {
    actions: Vec<RegisteredAction>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every controller action the platform ships.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("index", "home", Arc::new(HomeAction));
        registry.register("user", "login", Arc::new(LoginAction));
        registry.register("user", "logout", Arc::new(LogoutAction));
        registry
    }

    /// Register a handler under lowercase controller id and action name.
    pub fn register(
        &mut self,
        controller: &str,
        action: &str,
        handler: Arc<dyn Action>,
    ) -> ActionId {
        let id = ActionId(self.actions.len());
        self.actions.push(RegisteredAction {
            controller: controller.to_lowercase(),
            action: action.to_string(),
            handler,
        });
        id
    }

    /// Resolve a target; `controller` is expected in lowercase form.
    pub fn resolve(&self, controller: &str, action: &str) -> Option<ActionId> {
        self.actions
            .iter()
            .position(|a| a.controller == controller && a.action == action)
            .map(ActionId)
    }

    pub fn handler(&self, id: ActionId) -> Arc<dyn Action> {
        Arc::clone(&self.actions[id.0].handler)
    }

    /// Human-readable `controller:action` label for diagnostics.
    pub fn target_name(&self, id: ActionId) -> String {
        let entry = &self.actions[id.0];
        format!("{}:{}", entry.controller, entry.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_targets_resolve() {
        let registry = ControllerRegistry::builtin();
        assert!(registry.resolve("index", "home").is_some());
        assert!(registry.resolve("user", "login").is_some());
        assert!(registry.resolve("user", "logout").is_some());
    }

    #[test]
    fn test_unknown_target_is_none() {
        let registry = ControllerRegistry::builtin();
        assert!(registry.resolve("index", "missing").is_none());
        assert!(registry.resolve("nosuch", "home").is_none());
    }

    #[test]
    fn test_target_name_roundtrip() {
        let registry = ControllerRegistry::builtin();
        let id = registry.resolve("user", "logout").unwrap();
        assert_eq!(registry.target_name(id), "user:logout");
    }
}
