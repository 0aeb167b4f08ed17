//! Core library for satwatch.
//!
//! Provides the session-aware client for the satellite monitoring REST API:
//!
//! - `api`: `ApiClient` with bearer authentication and one-shot token refresh
//! - `auth`: pluggable token stores and the derived session state
//! - `models`: typed records for every endpoint the client calls
//! - `config`: persisted client configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{SessionState, TokenKind, TokenStore};
pub use config::Config;
