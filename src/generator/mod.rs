// src/generator/mod.rs
// Upstream content sources for the dedup fetcher

use async_trait::async_trait;

pub mod joke_api;

pub use joke_api::JokeApiGenerator;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("Generator exhausted: {0}")]
    Exhausted(String),
}

/// Zero-argument source of content. Failures are never fatal to the caller.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generator name for logging
    fn name(&self) -> &'static str;

    async fn generate(&self) -> Result<String, GenerationError>;
}

/// Adapts a synchronous closure into a generator
pub struct FnGenerator<F> {
    name: &'static str,
    f: F,
}

impl<F> FnGenerator<F>
where
    F: Fn() -> Result<String, GenerationError> + Send + Sync,
{
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

#[async_trait]
impl<F> ContentGenerator for FnGenerator<F>
where
    F: Fn() -> Result<String, GenerationError> + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    async fn generate(&self) -> Result<String, GenerationError> {
        (self.f)()
    }
}
