// src/dedup/mod.rs

//! Per-user novelty filter in front of an unreliable content generator.
//!
//! Each user owns a seen set of content fingerprints. `fetch_unique` calls
//! the generator up to `retry_budget` times looking for something the user
//! has not seen; when the budget runs out the seen set is cleared and one
//! more generated item is accepted unconditionally, so every call returns
//! content. Seen sets are locked per user, so distinct users never contend.

use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::generator::ContentGenerator;
use crate::store::{self, DurableStore};

pub mod fingerprint;

pub use fingerprint::Fingerprint;

/// Result of a `fetch_unique` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub content: String,
    /// Generator calls made, including the one after a reset
    pub attempts: u32,
    /// Whether the budget ran out and the seen set was cleared
    pub reset: bool,
}

#[derive(Default)]
struct SeenSet {
    loaded: bool,
    fingerprints: BTreeSet<Fingerprint>,
}

pub struct DedupFetcher {
    retry_budget: u32,
    fallback_content: String,
    store: Option<Arc<dyn DurableStore>>,
    users: Mutex<HashMap<String, Arc<AsyncMutex<SeenSet>>>>,
}

impl DedupFetcher {
    pub fn new(retry_budget: u32, fallback_content: impl Into<String>) -> Self {
        Self {
            retry_budget,
            fallback_content: fallback_content.into(),
            store: None,
            users: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.retry_budget, config.fallback_content.clone())
    }

    /// Persist seen sets through `store`; sets are loaded lazily per user
    pub fn with_store(mut self, store: Arc<dyn DurableStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn retry_budget(&self) -> u32 {
        self.retry_budget
    }

    /// Content the user has not seen yet, or a repeat after a reset
    pub async fn fetch_unique(
        &self,
        user_id: &str,
        generator: &dyn ContentGenerator,
    ) -> EngineResult<FetchOutcome> {
        let entry = self.entry(user_id);
        let mut seen = entry.lock().await;
        self.ensure_loaded(user_id, &mut seen).await?;

        for attempt in 1..=self.retry_budget {
            let content = self.generate(generator).await;
            let fingerprint = Fingerprint::of(&content);

            if seen.fingerprints.contains(&fingerprint) {
                debug!(user_id, attempt, "Generated content already seen");
                continue;
            }

            self.record(user_id, &mut seen, fingerprint).await?;
            return Ok(FetchOutcome {
                content,
                attempts: attempt,
                reset: false,
            });
        }

        let content = self.reset_locked(user_id, &mut seen, generator).await?;
        Ok(FetchOutcome {
            content,
            attempts: self.retry_budget + 1,
            reset: true,
        })
    }

    /// Clear the user's history, then accept one freshly generated item
    pub async fn reset_and_accept(
        &self,
        user_id: &str,
        generator: &dyn ContentGenerator,
    ) -> EngineResult<String> {
        let entry = self.entry(user_id);
        let mut seen = entry.lock().await;
        self.ensure_loaded(user_id, &mut seen).await?;
        self.reset_locked(user_id, &mut seen, generator).await
    }

    /// Number of fingerprints currently remembered for the user
    pub async fn seen_count(&self, user_id: &str) -> EngineResult<usize> {
        let entry = self.entry(user_id);
        let mut seen = entry.lock().await;
        self.ensure_loaded(user_id, &mut seen).await?;
        Ok(seen.fingerprints.len())
    }

    pub async fn has_seen(&self, user_id: &str, content: &str) -> EngineResult<bool> {
        let entry = self.entry(user_id);
        let mut seen = entry.lock().await;
        self.ensure_loaded(user_id, &mut seen).await?;
        Ok(seen.fingerprints.contains(&Fingerprint::of(content)))
    }

    /// Drop the user's history without generating anything
    pub async fn forget(&self, user_id: &str) -> EngineResult<()> {
        let entry = self.entry(user_id);
        let mut seen = entry.lock().await;
        self.ensure_loaded(user_id, &mut seen).await?;
        self.replace(user_id, &mut seen, BTreeSet::new()).await
    }

    fn entry(&self, user_id: &str) -> Arc<AsyncMutex<SeenSet>> {
        self.users
            .lock()
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }

    async fn generate(&self, generator: &dyn ContentGenerator) -> String {
        match generator.generate().await {
            Ok(content) => content,
            Err(e) => {
                warn!("Generator '{}' failed, using fallback: {}", generator.name(), e);
                self.fallback_content.clone()
            }
        }
    }

    async fn reset_locked(
        &self,
        user_id: &str,
        seen: &mut SeenSet,
        generator: &dyn ContentGenerator,
    ) -> EngineResult<String> {
        info!(
            user_id,
            budget = self.retry_budget,
            cleared = seen.fingerprints.len(),
            "Retry budget exhausted, resetting seen set"
        );
        self.replace(user_id, seen, BTreeSet::new()).await?;

        let content = self.generate(generator).await;
        self.record(user_id, seen, Fingerprint::of(&content)).await?;
        Ok(content)
    }

    async fn ensure_loaded(&self, user_id: &str, seen: &mut SeenSet) -> EngineResult<()> {
        if seen.loaded {
            return Ok(());
        }
        if let Some(store) = &self.store {
            let saved: Option<BTreeSet<Fingerprint>> =
                store::load_json(store.as_ref(), &seen_key(user_id)).await?;
            seen.fingerprints = saved.unwrap_or_default();
        }
        seen.loaded = true;
        Ok(())
    }

    async fn record(
        &self,
        user_id: &str,
        seen: &mut SeenSet,
        fingerprint: Fingerprint,
    ) -> EngineResult<()> {
        let mut updated = seen.fingerprints.clone();
        updated.insert(fingerprint);
        self.replace(user_id, seen, updated).await
    }

    /// Persist first, then swap in memory, so a failed save changes nothing
    async fn replace(
        &self,
        user_id: &str,
        seen: &mut SeenSet,
        fingerprints: BTreeSet<Fingerprint>,
    ) -> EngineResult<()> {
        if let Some(store) = &self.store {
            store::save_json(store.as_ref(), &seen_key(user_id), &fingerprints).await?;
        }
        seen.fingerprints = fingerprints;
        Ok(())
    }
}

fn seen_key(user_id: &str) -> String {
    format!("seen:{}", user_id)
}
