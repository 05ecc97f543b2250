// src/repository/friends.rs
// Symmetric friend graph, one adjacency set per user

use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use super::RepositoryError;
use crate::store::{self, DurableStore};

pub struct FriendRepository {
    store: Arc<dyn DurableStore>,
    // Both endpoints of an edge change together
    write_lock: Mutex<()>,
}

impl FriendRepository {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn add(&self, user_id: &str, friend_id: &str) -> Result<(), RepositoryError> {
        if user_id == friend_id {
            return Err(RepositoryError::SelfReference(user_id.to_string()));
        }

        let _guard = self.write_lock.lock().await;
        let mut mine = self.load(user_id).await?;
        if mine.contains(friend_id) {
            return Err(RepositoryError::AlreadyExists {
                user: user_id.to_string(),
                friend: friend_id.to_string(),
            });
        }
        let mut theirs = self.load(friend_id).await?;
        let before = mine.clone();

        mine.insert(friend_id.to_string());
        theirs.insert(user_id.to_string());
        self.save_edge(user_id, &mine, &before, friend_id, &theirs).await?;

        info!(user_id, friend_id, "Friendship added");
        Ok(())
    }

    pub async fn remove(&self, user_id: &str, friend_id: &str) -> Result<(), RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let mut mine = self.load(user_id).await?;
        let before = mine.clone();
        if !mine.remove(friend_id) {
            return Err(RepositoryError::NotFound {
                user: user_id.to_string(),
                friend: friend_id.to_string(),
            });
        }
        let mut theirs = self.load(friend_id).await?;
        theirs.remove(user_id);

        self.save_edge(user_id, &mine, &before, friend_id, &theirs).await?;

        info!(user_id, friend_id, "Friendship removed");
        Ok(())
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<String>, RepositoryError> {
        Ok(self.load(user_id).await?.into_iter().collect())
    }

    pub async fn are_friends(&self, user_id: &str, friend_id: &str) -> Result<bool, RepositoryError> {
        Ok(self.load(user_id).await?.contains(friend_id))
    }

    async fn load(&self, user_id: &str) -> Result<BTreeSet<String>, RepositoryError> {
        Ok(store::load_json(self.store.as_ref(), &friends_key(user_id))
            .await?
            .unwrap_or_default())
    }

    /// Write both sides of an edge. If the second write fails the first side
    /// is put back to `before`, so the graph never holds a one-sided edge.
    async fn save_edge(
        &self,
        user_id: &str,
        mine: &BTreeSet<String>,
        before: &BTreeSet<String>,
        friend_id: &str,
        theirs: &BTreeSet<String>,
    ) -> Result<(), RepositoryError> {
        self.save(user_id, mine).await?;
        if let Err(e) = self.save(friend_id, theirs).await {
            if let Err(rollback) = self.save(user_id, before).await {
                error!(user_id, friend_id, "Failed to roll back friend edge: {}", rollback);
            }
            return Err(e);
        }
        Ok(())
    }

    async fn save(&self, user_id: &str, friends: &BTreeSet<String>) -> Result<(), RepositoryError> {
        store::save_json(self.store.as_ref(), &friends_key(user_id), friends).await?;
        Ok(())
    }
}

fn friends_key(user_id: &str) -> String {
    format!("friends:{}", user_id)
}
