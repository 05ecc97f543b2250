// src/api/mod.rs
// HTTP surface: admin ingestion, webhook command dispatch, health

pub mod error;
pub mod http;

// Re-export commonly used items for external convenience
pub use error::{ApiError, ApiResult};
pub use http::http_router;
