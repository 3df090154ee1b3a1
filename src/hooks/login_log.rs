//! Login audit logging.
//!
//! Appends one document to the `LoginLog` collection per recorded login
//! event. The write happens inline in the request task; a failure is a
//! storage-class fault for that request only.

use async_trait::async_trait;
use mongodb::bson::{doc, DateTime, Document};
use mongodb::Collection;

use crate::error::AppError;
use crate::hooks::{LoginHook, LoginKind};
use crate::http::request::RequestInfo;
use crate::storage::Storage;

pub struct LoginLogService {
    collection: Collection<Document>,
}

impl LoginLogService {
    pub fn new(storage: &Storage) -> Self {
        Self {
            collection: storage.collection("LoginLog"),
        }
    }

    /// Insert one login record. The user agent arrives pre-sanitized:
    /// `RequestInfo` yields `None` for values that are not clean text.
    pub async fn append_log(
        &self,
        uid: i64,
        kind: LoginKind,
        user_agent: Option<&str>,
        ip: Option<&str>,
    ) -> Result<(), AppError> {
        let record = doc! {
            "uid": uid,
            "at": DateTime::now(),
            "type": kind.code(),
            "ua": user_agent.map(str::to_string),
            "ip": ip.map(str::to_string),
        };
        self.collection.insert_one(record).await?;
        Ok(())
    }
}

#[async_trait]
impl LoginHook for LoginLogService {
    async fn on_login(
        &self,
        request: &RequestInfo,
        kind: LoginKind,
        uid: i64,
    ) -> Result<(), AppError> {
        if !kind.recorded() {
            return Ok(());
        }
        self.append_log(uid, kind, request.user_agent(), request.client_ip())
            .await
    }
}
