mod assistant;
mod auth;
mod chat;
mod config;
mod db;
mod errors;
mod gigs;
mod models;
mod profiles;
mod routes;
mod state;

#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assistant::OpenAiClient;
use crate::chat::threads::{MemoryThreadStore, RedisThreadStore, ThreadStore};
use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Vira API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize thread memory
    let threads: Arc<dyn ThreadStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Redis thread store initialized");
            Arc::new(RedisThreadStore::new(client, config.chat.thread_ttl))
        }
        None => {
            warn!("REDIS_URL not set; chat threads are remembered in memory only");
            Arc::new(MemoryThreadStore::default())
        }
    };

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Initialize OpenAI Assistants client
    let assistants = OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
    )?;
    let configured = config.assistants.configured();
    if configured.is_empty() {
        warn!("No mentor assistants configured; chat routes will fail");
    } else {
        info!(
            "Mentor assistants configured: {}",
            configured
                .iter()
                .map(|v| v.slug())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    // Build app state
    let state = AppState {
        db,
        s3,
        assistants: Arc::new(assistants),
        threads,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "vira-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
