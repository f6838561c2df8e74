use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use dotenv::dotenv;
use std::sync::Arc;

use quill_backend::auth::TokenIssuer;
use quill_backend::config::Config;
use quill_backend::db::Database;
use quill_backend::{AppState, controllers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;

    log::info!("Quill backend v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Initializing database at {}", config.database_url);
    let db = Database::new(&config.database_url).expect("Failed to initialize database");
    let db = Arc::new(db);

    let tokens = TokenIssuer::new(config.secret_key.clone(), config.token_ttl_minutes);
    log::info!("Access tokens expire after {} minutes", config.token_ttl_minutes);

    let state = web::Data::new(AppState { db, config, tokens });

    log::info!("Starting HTTP server on port {}", port);
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(controllers::health::config_routes)
            .configure(controllers::auth::config)
            .configure(controllers::notes::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
