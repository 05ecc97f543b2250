// src/lib.rs

pub mod api;
pub mod bot;
pub mod config;
pub mod dedup;
pub mod error;
pub mod generator;
pub mod repository;
pub mod rotation;
pub mod state;
pub mod store;
pub mod tasks;

// Export commonly used items
pub use config::{CONFIG, EngineConfig};
pub use dedup::{DedupFetcher, FetchOutcome, Fingerprint};
pub use error::{EngineError, EngineResult};
pub use rotation::{ContentItem, PoolRotator};
pub use state::AppState;
