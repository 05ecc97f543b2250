// src/rotation/mod.rs

//! Shared content pool handed out round-robin, one private cursor per user.
//!
//! The pool and the cursor map form a single critical section: `next` reads
//! the pool length and moves a cursor atomically with respect to `insert`,
//! `evict` and `remove`. Cursors are plain indices and are never migrated
//! when the pool shrinks; `next` re-wraps them modulo the current length, so
//! a user may see an item skipped or repeated after an eviction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::store::{self, DurableStore};

const STATE_KEY: &str = "rotation:state";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: u64,
    /// Reference to the content, usually an image URL
    pub payload: String,
    pub created_at: DateTime<Utc>,
}

impl ContentItem {
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.created_at)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RotationState {
    items: Vec<ContentItem>,
    cursors: HashMap<String, usize>,
    last_id: u64,
}

pub struct PoolRotator {
    state: Mutex<RotationState>,
    lifetime: Duration,
    store: Option<Arc<dyn DurableStore>>,
}

impl PoolRotator {
    /// Process-lifetime rotator
    pub fn new(lifetime: Duration) -> Self {
        Self {
            state: Mutex::new(RotationState::default()),
            lifetime,
            store: None,
        }
    }

    /// Rotator backed by a durable store, resuming any saved pool and cursors
    pub async fn restore(lifetime: Duration, store: Arc<dyn DurableStore>) -> EngineResult<Self> {
        let state: RotationState = store::load_json(store.as_ref(), STATE_KEY)
            .await?
            .unwrap_or_default();

        info!(
            "Restored content pool from {} store: {} items, {} cursors",
            store.name(),
            state.items.len(),
            state.cursors.len()
        );

        Ok(Self {
            state: Mutex::new(state),
            lifetime,
            store: Some(store),
        })
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Append a new item stamped with the current time
    pub async fn insert(&self, payload: impl Into<String>) -> EngineResult<ContentItem> {
        self.insert_at(payload, Utc::now()).await
    }

    /// Append a new item with an explicit creation time, clamped to now
    pub async fn insert_at(
        &self,
        payload: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> EngineResult<ContentItem> {
        let payload = payload.into();
        let created_at = created_at.min(Utc::now());

        let mut guard = self.state.lock().await;
        let item = self
            .commit(&mut guard, move |state| {
                state.last_id += 1;
                let item = ContentItem {
                    id: state.last_id,
                    payload,
                    created_at,
                };
                state.items.push(item.clone());
                item
            })
            .await?;

        info!(id = item.id, pool_size = guard.items.len(), "Content item added");
        Ok(item)
    }

    /// Next item in the user's round-robin sequence
    pub async fn next(&self, user_id: &str) -> EngineResult<ContentItem> {
        let mut guard = self.state.lock().await;
        if guard.items.is_empty() {
            return Err(EngineError::EmptyPool);
        }

        self.commit(&mut guard, |state| {
            let len = state.items.len();
            let position = state.cursors.get(user_id).copied().unwrap_or(0);
            let item = state.items[position % len].clone();
            state.cursors.insert(user_id.to_string(), (position + 1) % len);
            debug!(user_id, position, len, item_id = item.id, "Rotated content");
            item
        })
        .await
    }

    /// Drop every item whose age has reached the configured lifetime.
    /// Returns how many were removed; cursors are left untouched.
    pub async fn evict(&self, now: DateTime<Utc>) -> EngineResult<usize> {
        // A lifetime too long for chrono can never elapse
        let Ok(lifetime) = chrono::Duration::from_std(self.lifetime) else {
            return Ok(0);
        };

        let mut guard = self.state.lock().await;
        let expired = guard
            .items
            .iter()
            .filter(|item| item.age(now) >= lifetime)
            .count();
        if expired == 0 {
            return Ok(0);
        }

        self.commit(&mut guard, |state| {
            state.items.retain(|item| item.age(now) < lifetime);
        })
        .await?;

        info!(evicted = expired, remaining = guard.items.len(), "Evicted expired content");
        Ok(expired)
    }

    /// Administrative removal of a single item
    pub async fn remove(&self, id: u64) -> EngineResult<Option<ContentItem>> {
        let mut guard = self.state.lock().await;
        let Some(index) = guard.items.iter().position(|item| item.id == id) else {
            return Ok(None);
        };

        let removed = self
            .commit(&mut guard, |state| state.items.remove(index))
            .await?;

        info!(id, "Content item removed by administrator");
        Ok(Some(removed))
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.items.is_empty()
    }

    /// Snapshot of the pool in insertion order
    pub async fn items(&self) -> Vec<ContentItem> {
        self.state.lock().await.items.clone()
    }

    /// Stored cursor value, `None` until the user's first `next`
    pub async fn cursor(&self, user_id: &str) -> Option<usize> {
        self.state.lock().await.cursors.get(user_id).copied()
    }

    /// Apply a mutation. With a store attached the mutation is staged on a
    /// copy and only committed once the snapshot has been saved.
    async fn commit<R>(
        &self,
        state: &mut RotationState,
        mutate: impl FnOnce(&mut RotationState) -> R,
    ) -> EngineResult<R> {
        match &self.store {
            None => Ok(mutate(state)),
            Some(store) => {
                let mut staged = state.clone();
                let out = mutate(&mut staged);
                store::save_json(store.as_ref(), STATE_KEY, &staged).await?;
                *state = staged;
                Ok(out)
            }
        }
    }
}
