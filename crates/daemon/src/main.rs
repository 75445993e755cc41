use axum::Router;
use tracing::info;
use tracing_subscriber;
use tower_http::cors::{CorsLayer, Any};

mod api;
mod auth;
mod config;
mod db;
mod llm;
mod sessions;
mod state;
mod videogen;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let db = db::Database::new(&config.db_path)?;
    info!("Database initialized at {:?}", config.db_path);

    if config.openai_api_key.is_none() {
        info!("OPENAI_API_KEY not set, storyboards will be built from answers directly");
    }

    let addr = config.bind_addr;
    let state = AppState::new(config, db);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_credentials(false);

    let app = Router::new()
        .nest("/api", api::router(state))
        .layer(cors);

    info!("Starting Story Catcher server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
