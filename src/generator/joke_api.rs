// src/generator/joke_api.rs
// Single-line jokes from jokeapi.dev

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{ContentGenerator, GenerationError};

const JOKE_PREFIX: &str = "😂 ";
const MISSING_JOKE: &str = "Joke not found 😅";

#[derive(Debug, Deserialize)]
struct JokeResponse {
    joke: Option<String>,
}

pub struct JokeApiGenerator {
    client: Client,
    url: String,
}

impl JokeApiGenerator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Rendered joke text; a body without a joke still yields content
    fn render(body: JokeResponse) -> String {
        let joke = body
            .joke
            .filter(|j| !j.trim().is_empty())
            .unwrap_or_else(|| MISSING_JOKE.to_string());
        format!("{}{}", JOKE_PREFIX, joke)
    }
}

#[async_trait]
impl ContentGenerator for JokeApiGenerator {
    fn name(&self) -> &'static str {
        "jokeapi"
    }

    async fn generate(&self) -> Result<String, GenerationError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Status(status.as_u16()));
        }

        let body: JokeResponse = response.json().await?;
        let joke = Self::render(body);
        debug!("Fetched joke ({} chars)", joke.len());
        Ok(joke)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prefixes_joke() {
        let body: JokeResponse =
            serde_json::from_str(r#"{"type":"single","joke":"I told a UDP joke.","id":7}"#).unwrap();
        assert_eq!(JokeApiGenerator::render(body), "😂 I told a UDP joke.");
    }

    #[test]
    fn test_render_missing_joke_field() {
        let body: JokeResponse = serde_json::from_str(r#"{"error":true}"#).unwrap();
        assert_eq!(JokeApiGenerator::render(body), "😂 Joke not found 😅");
    }
}
