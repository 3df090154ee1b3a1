//! Application context: explicit dependency wiring.
//!
//! Everything a request handler may touch is bundled here and passed down
//! explicitly; there is no process-global service locator. All fields are
//! built once at startup and immutable afterwards, so the context is shared
//! across request tasks behind an `Arc` without locks.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::controller::ControllerRegistry;
use crate::error::AppError;
use crate::hooks::dispatch_log::DispatchLogService;
use crate::hooks::https_redirect::HttpsRedirectionService;
use crate::hooks::login_log::LoginLogService;
use crate::hooks::{HookSet, LoginKind};
use crate::http::request::RequestInfo;
use crate::routing::{RouteTable, RouteTableError};
use crate::session::{MemorySessionStore, MongoSessionStore, SessionStore};
use crate::storage::Storage;
use crate::user::auth::{Authenticator, MongoAuthenticator};

/// Fatal startup error.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("routing: {0}")]
    Routes(#[from] RouteTableError),
    #[error("storage: {0}")]
    Storage(#[from] AppError),
}

/// Immutable bundle of configuration and wired services.
pub struct AppContext {
    pub config: AppConfig,
    pub routes: RouteTable,
    pub registry: ControllerRegistry,
    pub hooks: HookSet,
    pub sessions: Arc<dyn SessionStore>,
    /// Credential verification; absent without a database, which disables
    /// interactive login.
    pub auth: Option<Arc<dyn Authenticator>>,
    pub storage: Option<Storage>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("auth", &self.auth.is_some())
            .field("storage", &self.storage.is_some())
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Wire the full application from validated configuration. Any failure
    /// here aborts startup; nothing is retried lazily at request time.
    pub async fn bootstrap(config: AppConfig) -> Result<Self, BootstrapError> {
        let registry = ControllerRegistry::builtin();
        let routes = RouteTable::build(&config.routes, &registry)?;

        let storage = match &config.mongodb {
            Some(mongo) => Some(Storage::connect(mongo).await?),
            None => {
                tracing::warn!("no mongodb configured; using in-memory sessions");
                None
            }
        };

        let ttl = Duration::from_secs(config.session.ttl_secs);
        let sessions: Arc<dyn SessionStore> = match &storage {
            Some(storage) => Arc::new(MongoSessionStore::new(storage, ttl)),
            None => Arc::new(MemorySessionStore::new(ttl)),
        };
        let auth: Option<Arc<dyn Authenticator>> = storage
            .as_ref()
            .map(|storage| Arc::new(MongoAuthenticator::new(storage)) as Arc<dyn Authenticator>);

        let mut hooks = HookSet::default();
        hooks.before_dispatch.push(Arc::new(HttpsRedirectionService::new(
            config.http.enforce_https,
            config.http.canonical_host.clone(),
        )));
        hooks.after_dispatch.push(Arc::new(DispatchLogService));
        if let Some(storage) = &storage {
            hooks.login.push(Arc::new(LoginLogService::new(storage)));
        }

        Ok(Self {
            config,
            routes,
            registry,
            hooks,
            sessions,
            auth,
            storage,
        })
    }

    /// Notify login hooks, in registration order. Called by authentication
    /// flows; the first failing hook aborts the notification.
    pub async fn notify_login(
        &self,
        request: &RequestInfo,
        kind: LoginKind,
        uid: i64,
    ) -> Result<(), AppError> {
        for hook in &self.hooks.login {
            hook.on_login(request, kind, uid).await?;
        }
        Ok(())
    }
}
