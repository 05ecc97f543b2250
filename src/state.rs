// src/state.rs
// Shared application state, assembled once at startup and injected everywhere

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::info;

use crate::{
    bot::CommandHandler,
    config::{BotConfig, EngineConfig, StateBackend},
    dedup::DedupFetcher,
    generator::{ContentGenerator, JokeApiGenerator},
    repository::{FriendRepository, UserRepository},
    rotation::PoolRotator,
    store::{DurableStore, MemoryStore, SqliteStore},
};

#[derive(Clone)]
pub struct AppState {
    // -------- Storage --------
    pub store: Arc<dyn DurableStore>,

    // -------- Engine --------
    pub engine: EngineConfig,
    pub rotator: Arc<PoolRotator>,
    pub fetcher: Arc<DedupFetcher>,
    pub generator: Arc<dyn ContentGenerator>,

    // -------- Repositories --------
    pub users: Arc<UserRepository>,
    pub friends: Arc<FriendRepository>,

    // -------- Command layer --------
    pub commands: Arc<CommandHandler>,

    admin_key_digest: Option<[u8; 32]>,
}

impl AppState {
    /// Wire every component over `store`. With `durable` set the rotator and
    /// fetcher persist through the store; otherwise their state lives only
    /// as long as the process.
    pub async fn assemble(
        engine: EngineConfig,
        store: Arc<dyn DurableStore>,
        durable: bool,
        generator: Arc<dyn ContentGenerator>,
        admin_key: &str,
    ) -> Result<Self> {
        let (rotator, fetcher) = if durable {
            let rotator = PoolRotator::restore(engine.item_lifetime, store.clone())
                .await
                .context("Failed to restore content pool")?;
            let fetcher = DedupFetcher::from_config(&engine).with_store(store.clone());
            (rotator, fetcher)
        } else {
            (
                PoolRotator::new(engine.item_lifetime),
                DedupFetcher::from_config(&engine),
            )
        };

        let rotator = Arc::new(rotator);
        let fetcher = Arc::new(fetcher);
        let users = Arc::new(UserRepository::new(store.clone()));
        let friends = Arc::new(FriendRepository::new(store.clone()));

        let commands = Arc::new(CommandHandler::new(
            rotator.clone(),
            fetcher.clone(),
            generator.clone(),
            users.clone(),
            friends.clone(),
        ));

        let admin_key_digest = (!admin_key.is_empty()).then(|| digest(admin_key));

        Ok(Self {
            store,
            engine,
            rotator,
            fetcher,
            generator,
            users,
            friends,
            commands,
            admin_key_digest,
        })
    }

    /// Shared-secret check for administrative endpoints. Always false when
    /// no key is configured.
    pub fn is_admin(&self, key: &str) -> bool {
        match &self.admin_key_digest {
            Some(expected) => digest(key) == *expected,
            None => false,
        }
    }
}

fn digest(value: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(value.as_bytes()));
    out
}

/// Open the configured store
pub async fn open_store(config: &BotConfig) -> Result<Arc<dyn DurableStore>> {
    let store: Arc<dyn DurableStore> = match config.state_backend {
        StateBackend::Memory => Arc::new(MemoryStore::new()),
        StateBackend::Sqlite => Arc::new(
            SqliteStore::connect(&config.database_url, config.sqlite_max_connections).await?,
        ),
    };
    info!("Using {} state backend", store.name());
    Ok(store)
}

/// Build the production state from configuration
pub async fn create_app_state(config: &BotConfig) -> Result<AppState> {
    let store = open_store(config).await?;

    let generator: Arc<dyn ContentGenerator> = Arc::new(
        JokeApiGenerator::new(config.joke_api_url.clone(), config.joke_timeout())
            .context("Failed to build joke API client")?,
    );

    AppState::assemble(
        config.engine(),
        store,
        config.durable(),
        generator,
        &config.admin_key,
    )
    .await
}
