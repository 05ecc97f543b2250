// src/repository/users.rs
// Registry of everyone who has started the bot

use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use super::RepositoryError;
use crate::store::{self, DurableStore};

const REGISTRY_KEY: &str = "users:registry";

pub struct UserRepository {
    store: Arc<dyn DurableStore>,
    // Serializes read-modify-write of the registry
    write_lock: Mutex<()>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Add the user; returns false if they were already registered
    pub async fn register(&self, user_id: &str) -> Result<bool, RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let mut users = self.load().await?;
        if !users.insert(user_id.to_string()) {
            return Ok(false);
        }

        store::save_json(self.store.as_ref(), REGISTRY_KEY, &users).await?;
        info!(user_id, total = users.len(), "Registered new user");
        Ok(true)
    }

    pub async fn contains(&self, user_id: &str) -> Result<bool, RepositoryError> {
        Ok(self.load().await?.contains(user_id))
    }

    pub async fn list(&self) -> Result<Vec<String>, RepositoryError> {
        Ok(self.load().await?.into_iter().collect())
    }

    async fn load(&self) -> Result<BTreeSet<String>, RepositoryError> {
        Ok(store::load_json(self.store.as_ref(), REGISTRY_KEY)
            .await?
            .unwrap_or_default())
    }
}
