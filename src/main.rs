// src/main.rs

use backend::config::Config;
use backend::repositories::PgRepository;
use backend::routes;
use backend::services::{judge::Judge0Client, oracle::GeminiOracle};
use backend::state::AppState;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Initialize Database Pool with Retry
    let mut retry_count = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    tracing::error!("Failed to connect to database after 5 retries: {}", e);
                    return;
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::error!("Failed to run database migrations: {}", e);
        return;
    }
    tracing::info!("Migrations applied successfully.");

    let judge = match Judge0Client::new(&config.judge) {
        Ok(judge) => judge,
        Err(e) => {
            tracing::error!("Failed to build judge client: {}", e);
            return;
        }
    };
    let oracle = match GeminiOracle::new(config.oracle.clone()) {
        Ok(oracle) => oracle,
        Err(e) => {
            tracing::error!("Failed to build evaluation client: {}", e);
            return;
        }
    };
    if config.judge.base_url.is_none() {
        tracing::warn!("JUDGE0_URL not set; coding questions stay ungraded and run-code returns 503");
    }
    if config.oracle.api_key.is_none() {
        tracing::warn!("GOOGLE_AI_API_KEY not set; interview answers get the fallback score");
    }

    let state = AppState::new(
        config.clone(),
        Arc::new(PgRepository::new(pool)),
        Arc::new(judge),
        Arc::new(oracle),
    );

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            return;
        }
    };

    // Start the server
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
