use playlist_filter::config::Config;
use playlist_filter::services::{CredentialStore, MemoryCredentialStore, RedisCredentialStore};
use playlist_filter::{build_router, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; LOG_FORMAT=json switches to structured output
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,playlist_filter=debug,tower_http=info".into()),
    );
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded (genre policy: {})", config.genre_policy);

    // Pick the session backend
    let store: Arc<dyn CredentialStore> = match &config.redis_url {
        Some(url) => {
            let redis_client = redis::Client::open(url.as_str())?;
            let redis = redis::aio::ConnectionManager::new(redis_client).await?;
            tracing::info!("Connected to Redis, sessions stored there");
            Arc::new(RedisCredentialStore::new(redis))
        }
        None => {
            tracing::info!("REDIS_URL not set, sessions kept in memory");
            Arc::new(MemoryCredentialStore::new())
        }
    };

    let app_state = Arc::new(AppState::new(&config, store)?);
    let app = build_router(app_state, &config.cors_origins);

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
