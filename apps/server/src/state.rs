//! Application state and bootstrap.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use cartlist_core::lists::{ListService, ListServiceTrait};
use cartlist_core::pricing::PriceSyncConsumer;
use cartlist_storage_sqlite::db::{self, write_actor};
use cartlist_storage_sqlite::ListRepository;

use crate::auth::AuthManager;
use crate::config::Config;
use crate::events::{BusPurchaseNotifier, EventBus};

/// Depth of the pricing feed queue. The consumer applies one event fully
/// before pulling the next, so a slow store backs intake up to the
/// ingest route.
const PRICE_FEED_CAPACITY: usize = 1024;

pub struct AppState {
    pub list_service: Arc<dyn ListServiceTrait>,
    pub price_feed: mpsc::Sender<String>,
    pub event_bus: EventBus,
    pub auth: AuthManager,
    pub api_key: String,
}

pub fn init_tracing() {
    let fmt_layer = fmt::layer().json().with_current_span(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Wires pool, writer, repository, service, and the price sync consumer.
/// The consumer is handed its own reference to the service here; nothing
/// in the process reaches it through globals.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone());

    let event_bus = EventBus::new(64);
    let repository = Arc::new(ListRepository::new(pool, writer));
    let list_service: Arc<dyn ListServiceTrait> = Arc::new(ListService::new(
        repository,
        Arc::new(BusPurchaseNotifier::new(event_bus.clone())),
    ));

    let (feed_tx, feed_rx) = mpsc::channel(PRICE_FEED_CAPACITY);
    let consumer = PriceSyncConsumer::new(list_service.clone());
    tokio::spawn(consumer.run(feed_rx));

    Ok(Arc::new(AppState {
        list_service,
        price_feed: feed_tx,
        event_bus,
        auth: AuthManager::new(&config.jwt_secret),
        api_key: config.api_key.clone(),
    }))
}
