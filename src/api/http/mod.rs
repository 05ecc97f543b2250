// src/api/http/mod.rs

mod admin;
mod handlers;
mod router;
mod webhook;

pub use router::http_router;
