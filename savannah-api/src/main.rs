use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use savannah_api::{app, auth, worker, AppState, Repositories};
use savannah_core::payment::PaymentGateway;
use savannah_core::storage::ObjectStore;
use savannah_order::ScriptedGateway;
use savannah_store::app_config::Config;
use savannah_store::{DbClient, MemoryObjectStore, MemoryStore, PaystackClient, RedisClient, S3ObjectStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "savannah_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Savannah API on port {} ({})", config.server.port, config.server.environment);

    // Persistence
    let (repos, db) = if config.database.is_memory() {
        tracing::warn!("Using the in-memory store, data is lost on restart");
        (Repositories::memory(Arc::new(MemoryStore::new())), None)
    } else {
        let db = DbClient::new(&config.database.url, config.database.max_connections)
            .await
            .context("Failed to connect to Postgres")?;
        db.migrate().await.context("Failed to run migrations")?;
        (Repositories::postgres(&db), Some(Arc::new(db)))
    };

    // Payment gateway
    let gateway: Arc<dyn PaymentGateway> = if config.payment.secret_key.is_empty() {
        tracing::warn!("payment.secret_key is empty, using the scripted gateway");
        Arc::new(ScriptedGateway::new())
    } else {
        Arc::new(PaystackClient::new(&config.payment)?)
    };

    // Object storage
    let objects: Arc<dyn ObjectStore> = if config.storage.bucket.is_empty() {
        tracing::warn!("storage.bucket is empty, uploads are kept in memory");
        Arc::new(MemoryObjectStore::new())
    } else {
        Arc::new(S3ObjectStore::new(&config.storage).await)
    };

    let mut state = AppState::build(&config, repos, gateway, objects)?;
    if let Some(db) = db {
        state = state.with_db(db);
    }

    // Redis Connection
    if let Some(url) = config.redis.url.as_deref().filter(|u| !u.is_empty()) {
        let redis = RedisClient::new(url).context("Invalid Redis URL")?;
        if !redis.ping().await {
            tracing::warn!("Redis did not answer, rate limiting fails open until it does");
        }
        state = state.with_redis(Arc::new(redis));
    }

    if let (Some(email), Some(password)) = (
        config.auth.bootstrap_admin_email.as_deref(),
        config.auth.bootstrap_admin_password.as_deref(),
    ) {
        if let Err(e) = auth::bootstrap_admin(&state, email, password).await {
            tracing::error!("Bootstrap admin not created: {:?}", e);
        }
    }

    tokio::spawn(worker::start_kpi_worker(state.kpis.clone()));

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
