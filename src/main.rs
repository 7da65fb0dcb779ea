use std::sync::Arc;

use coindiary_api::database::PgEngine;
use coindiary_api::notify::Notifier;
use coindiary_api::policy::RoleAccessPolicy;
use coindiary_api::{app, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = coindiary_api::config::config();
    tracing::info!("Starting coindiary API in {:?} mode", config.environment);

    let engine = match PgEngine::from_env().await {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("failed to initialize database engine: {}", err);
            std::process::exit(1);
        }
    };

    let state = AppState {
        engine: Arc::new(engine),
        policy: Arc::new(RoleAccessPolicy::from_config()),
        notifier: Notifier::from_config(),
    };

    // Allow tests or deployments to override port via env
    let port = std::env::var("COINDIARY_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("coindiary API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.expect("server");
}
