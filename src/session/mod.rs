//! Session storage behind a narrow interface.
//!
//! # Responsibilities
//! - Load/save/destroy opaque session payloads by session ID
//! - Expire sessions past the configured TTL
//!
//! # Design Decisions
//! - The payload is an opaque byte string; its serialization format belongs
//!   to the session layer above, not to storage
//! - MongoDB-backed in production; an in-process store backs development
//!   and tests when no database is configured

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use mongodb::bson::spec::BinarySubtype;
use mongodb::bson::{doc, Binary, Bson, DateTime, Document};
use mongodb::Collection;

use crate::error::AppError;
use crate::storage::Storage;

/// Narrow session-persistence contract used by the pipeline layer.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: &str) -> Result<Option<Vec<u8>>, AppError>;
    async fn save(&self, id: &str, payload: &[u8]) -> Result<(), AppError>;
    async fn destroy(&self, id: &str) -> Result<(), AppError>;
    /// Remove expired sessions; returns the number removed.
    async fn purge_expired(&self) -> Result<u64, AppError>;
}

/// Spawn the background task that removes expired sessions on a fixed
/// interval. Expired sessions are already invisible to `load`; the purge
/// keeps the store from accumulating dead records. A failed sweep is
/// logged and retried on the next tick.
pub fn spawn_purge_task(
    store: Arc<dyn SessionStore>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => tracing::debug!(purged, "expired sessions removed"),
                Err(err) => tracing::warn!(error = %err, "session purge failed"),
            }
        }
    })
}

/// Sessions persisted in the `Session` collection.
pub struct MongoSessionStore {
    collection: Collection<Document>,
    ttl: Duration,
}

impl MongoSessionStore {
    pub fn new(storage: &Storage, ttl: Duration) -> Self {
        Self {
            collection: storage.collection("Session"),
            ttl,
        }
    }

    fn expiry(&self) -> DateTime {
        DateTime::from_system_time(std::time::SystemTime::now() + self.ttl)
    }
}

#[async_trait]
impl SessionStore for MongoSessionStore {
    async fn load(&self, id: &str) -> Result<Option<Vec<u8>>, AppError> {
        let found = self.collection.find_one(doc! { "_id": id }).await?;
        let Some(document) = found else {
            return Ok(None);
        };
        if let Ok(expire_at) = document.get_datetime("expire_at") {
            if *expire_at < DateTime::now() {
                return Ok(None);
            }
        }
        match document.get("data") {
            Some(Bson::Binary(binary)) => Ok(Some(binary.bytes.clone())),
            _ => Ok(None),
        }
    }

    async fn save(&self, id: &str, payload: &[u8]) -> Result<(), AppError> {
        let data = Binary {
            subtype: BinarySubtype::Generic,
            bytes: payload.to_vec(),
        };
        self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "data": data, "expire_at": self.expiry() } },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn destroy(&self, id: &str) -> Result<(), AppError> {
        self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, AppError> {
        let result = self
            .collection
            .delete_many(doc! { "expire_at": { "$lt": DateTime::now() } })
            .await?;
        Ok(result.deleted_count)
    }
}

/// In-process store for development and tests. Not shared across workers.
#[derive(Default)]
pub struct MemorySessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, (Vec<u8>, Instant)>>,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &str) -> Result<Option<Vec<u8>>, AppError> {
        let sessions = self.sessions.lock().expect("session store poisoned");
        Ok(sessions
            .get(id)
            .filter(|(_, expires)| *expires > Instant::now())
            .map(|(payload, _)| payload.clone()))
    }

    async fn save(&self, id: &str, payload: &[u8]) -> Result<(), AppError> {
        let mut sessions = self.sessions.lock().expect("session store poisoned");
        sessions.insert(id.to_string(), (payload.to_vec(), Instant::now() + self.ttl));
        Ok(())
    }

    async fn destroy(&self, id: &str) -> Result<(), AppError> {
        let mut sessions = self.sessions.lock().expect("session store poisoned");
        sessions.remove(id);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, AppError> {
        let mut sessions = self.sessions.lock().expect("session store poisoned");
        let before = sessions.len();
        sessions.retain(|_, (_, expires)| *expires > Instant::now());
        Ok((before - sessions.len()) as u64)
    }
}
