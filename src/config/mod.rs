// src/config/mod.rs
// Load all values from .env / environment, falling back to defaults

use once_cell::sync::Lazy;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_ITEM_LIFETIME: Duration = Duration::from_secs(30 * 24 * 60 * 60);
pub const DEFAULT_EVICTION_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_RETRY_BUDGET: u32 = 20;
pub const DEFAULT_FALLBACK_CONTENT: &str = "😂 Joke not found 😅";
pub const DEFAULT_JOKE_API_URL: &str = "https://v2.jokeapi.dev/joke/Any?type=single&safe-mode";

/// Knobs of the rotation and dedup engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Items at least this old are evicted from the pool
    pub item_lifetime: Duration,
    pub eviction_interval: Duration,
    /// Generator calls made before the seen set is reset
    pub retry_budget: u32,
    /// Substituted when the generator fails
    pub fallback_content: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            item_lifetime: DEFAULT_ITEM_LIFETIME,
            eviction_interval: DEFAULT_EVICTION_INTERVAL,
            retry_budget: DEFAULT_RETRY_BUDGET,
            fallback_content: DEFAULT_FALLBACK_CONTENT.to_string(),
        }
    }
}

/// Where engine and repository state lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateBackend {
    Memory,
    Sqlite,
}

impl FromStr for StateBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(StateBackend::Memory),
            "sqlite" | "db" => Ok(StateBackend::Sqlite),
            other => Err(format!("unknown state backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    // ── Server
    pub host: String,
    pub port: u16,
    pub admin_key: String,

    // ── State
    pub state_backend: StateBackend,
    pub database_url: String,
    pub sqlite_max_connections: u32,

    // ── Engine
    pub item_lifetime_secs: u64,
    pub eviction_interval_secs: u64,
    pub retry_budget: u32,
    pub fallback_content: String,

    // ── Joke API
    pub joke_api_url: String,
    pub joke_timeout_secs: u64,

    // ── Logging
    pub log_level: String,
}

// Numeric and enum knobs: tolerates trailing comments and extra whitespace.
fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => parse_knob(key, &val, default),
        Err(_) => default,
    }
}

fn parse_knob<T: FromStr>(key: &str, val: &str, default: T) -> T {
    let clean_val = val.split('#').next().unwrap_or("").trim();
    match clean_val.parse::<T>() {
        Ok(parsed) => parsed,
        Err(_) => {
            eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
            default
        }
    }
}

// Free-text values (keys, URLs, messages) are taken verbatim; '#' is data here.
fn env_string_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl BotConfig {
    pub fn from_env() -> Self {
        // Load from .env file first if it exists
        if dotenvy::dotenv().is_err() {
            eprintln!("Warning: .env file not found. Using environment variables and defaults.");
        }

        Self {
            host: env_string_or("BOT_HOST", "0.0.0.0"),
            port: env_var_or("PORT", 3000),
            admin_key: env_string_or("ADMIN_KEY", ""),
            state_backend: env_var_or("STATE_BACKEND", StateBackend::Memory),
            database_url: env_string_or("DATABASE_URL", "sqlite:./contentbot.db?mode=rwc"),
            sqlite_max_connections: env_var_or("SQLITE_MAX_CONNECTIONS", 5),
            item_lifetime_secs: env_var_or("ITEM_LIFETIME_SECS", DEFAULT_ITEM_LIFETIME.as_secs()),
            eviction_interval_secs: env_var_or(
                "EVICTION_INTERVAL_SECS",
                DEFAULT_EVICTION_INTERVAL.as_secs(),
            ),
            retry_budget: env_var_or("RETRY_BUDGET", DEFAULT_RETRY_BUDGET),
            fallback_content: env_string_or("FALLBACK_CONTENT", DEFAULT_FALLBACK_CONTENT),
            joke_api_url: env_string_or("JOKE_API_URL", DEFAULT_JOKE_API_URL),
            joke_timeout_secs: env_var_or("JOKE_TIMEOUT_SECS", 10),
            log_level: env_var_or("LOG_LEVEL", "info".to_string()),
        }
    }

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Uploads are refused outright while no admin key is configured
    pub fn admin_enabled(&self) -> bool {
        !self.admin_key.is_empty()
    }

    /// Whether engine state outlives the process
    pub fn durable(&self) -> bool {
        self.state_backend == StateBackend::Sqlite
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            item_lifetime: Duration::from_secs(self.item_lifetime_secs),
            eviction_interval: Duration::from_secs(self.eviction_interval_secs.max(1)),
            retry_budget: self.retry_budget,
            fallback_content: self.fallback_content.clone(),
        }
    }

    pub fn joke_timeout(&self) -> Duration {
        Duration::from_secs(self.joke_timeout_secs)
    }

    pub fn log_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

// Global config instance - loaded once at startup
pub static CONFIG: Lazy<BotConfig> = Lazy::new(BotConfig::from_env);
