//! HTTP surface over the query executor.

pub mod config;
pub mod engine;
pub mod error;
pub mod fs;
pub mod http;
pub mod reports;
pub mod routes;
pub mod views;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{ApiError, EngineError};
pub use routes::{AppState, router};
