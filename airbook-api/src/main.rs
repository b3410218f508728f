use airbook_api::{app, AppState};
use airbook_core::{BookingAccess, FlightAccess};
use airbook_store::app_config::Config;
use airbook_store::{DbClient, KafkaPublisher, PgBookingStore, PgFlightStore, RedisCache};
use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "airbook_api=debug,airbook_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Airbook API on port {}", config.server.port);

    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to Postgres")?;

    let cache = Arc::new(
        RedisCache::new(&config.redis.url)
            .await
            .context("Failed to connect to Redis")?,
    );

    let publisher = Arc::new(
        KafkaPublisher::new(&config.kafka).context("Failed to create Kafka producer")?,
    );

    let budget = config.access.budget();

    let mut flights = FlightAccess::new(Arc::new(PgFlightStore::new(db.pool.clone())), cache.clone())
        .with_budget(budget);
    if let Some(topic) = &config.kafka.flight_topic {
        flights = flights.with_events(publisher.clone(), topic.clone());
    }

    let bookings = BookingAccess::new(
        Arc::new(PgBookingStore::new(db.pool.clone())),
        cache,
        publisher,
        config.kafka.booking_topic.clone(),
    )
    .with_budget(budget)
    .with_dedupe_mode(config.access.dedupe_mode);

    let app_state = AppState {
        flights: Arc::new(flights),
        bookings: Arc::new(bookings),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
