//! Quill backend — a notes service with token-based authentication and a
//! many-to-many note↔tag relation, exposed as a JSON HTTP API.

pub mod auth;
pub mod config;
pub mod controllers;
pub mod db;
pub mod error;
pub mod models;

use std::sync::Arc;

use auth::TokenIssuer;
use config::Config;
use db::Database;

/// Shared application state handed to every request handler.
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
    pub tokens: TokenIssuer,
}
