//! Document database wiring.
//!
//! # Design Decisions
//! - One client per process; collections are handed out as narrow handles
//!   so consumers never see connection management
//! - Connectivity failures map to `AppError::Storage`, which the boundary
//!   logs at escalated severity

use std::time::Duration;

use mongodb::bson::Document;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};

use crate::config::schema::MongoConfig;
use crate::error::AppError;

/// Handle to the platform's MongoDB database.
#[derive(Clone)]
pub struct Storage {
    database: Database,
}

impl Storage {
    /// Connect and select the configured database. Called once at startup;
    /// an unreachable server surfaces on first use, not here, per driver
    /// semantics.
    pub async fn connect(config: &MongoConfig) -> Result<Self, AppError> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.connect_timeout = Some(Duration::from_millis(config.connect_timeout_ms));
        options.app_name = Some("openvj".to_string());
        let client = Client::with_options(options)?;
        Ok(Self {
            database: client.database(&config.database),
        })
    }

    pub fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }
}
