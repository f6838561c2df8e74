//! Quill bot — Telegram front end for the Quill notes backend.
//!
//! Walks users through login, note creation and tag search, proxying every
//! action to the backend HTTP API with the user's own bearer token.

use std::sync::Arc;

use teloxide::prelude::*;

mod api_client;
mod config;
mod flow;
mod handlers;
mod sessions;

use api_client::ApiClient;
use config::Config;
use sessions::SessionStore;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    log::info!("Quill bot v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Backend API at {}", config.api_url);

    let store = Arc::new(
        SessionStore::new(&config.session_db, config.session_ttl_minutes)
            .expect("Failed to initialize session store"),
    );
    match store.sweep_expired() {
        Ok(0) => {}
        Ok(n) => log::info!("Swept {} expired chat sessions", n),
        Err(e) => log::warn!("Failed to sweep expired sessions: {}", e),
    }

    let api = Arc::new(ApiClient::new(&config.api_url));

    // Reads TELOXIDE_TOKEN
    let bot = Bot::from_env();

    let handler = Update::filter_message().endpoint(handlers::handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![store, api])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
