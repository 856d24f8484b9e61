use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use holdersync_core::{
    collection::{parse_mint_list, CollectionService, CollectionServiceTrait, NewTrackedMint},
    ingest::IngestService,
    ownership::{OwnershipRepositoryTrait, OwnershipService, OwnershipServiceTrait},
    watchlist::{InMemoryWatchlistProvider, WatchlistProviderTrait, WatchlistScheduler},
};
use holdersync_provider::WebhookApiClient;
use holdersync_storage_sqlite::{
    collection::CollectionRepository,
    db::{self, spawn_writer},
    ownership::OwnershipRepository,
};

use crate::{config::Config, ingest_queue::IngestQueue};

pub struct AppState {
    pub ownership_service: Arc<dyn OwnershipServiceTrait>,
    pub collection_service: Arc<dyn CollectionServiceTrait>,
    pub watchlist_provider: Arc<dyn WatchlistProviderTrait>,
    pub watchlist_scheduler: WatchlistScheduler,
    pub ingest_queue: IngestQueue,
    pub webhook_auth_header: Option<String>,
    pub admin_key: Option<String>,
}

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);
    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone());

    let ownership_repository: Arc<dyn OwnershipRepositoryTrait> = Arc::new(
        OwnershipRepository::new(pool.clone(), writer.clone()),
    );
    let collection_repository = Arc::new(CollectionRepository::new(pool.clone(), writer));

    let collection_service = Arc::new(CollectionService::new(collection_repository.clone()));
    seed_collection(config, collection_service.as_ref()).await?;

    let watchlist_provider = build_provider(config)?;
    let watchlist_scheduler = WatchlistScheduler::spawn(
        config.scheduler.clone(),
        ownership_repository.clone(),
        watchlist_provider.clone(),
    );
    if config.startup_sync {
        watchlist_scheduler.request_sync();
    }

    let ownership_service = Arc::new(OwnershipService::new(
        ownership_repository,
        collection_repository,
    ));
    let ingest_service = Arc::new(IngestService::new(
        ownership_service.clone(),
        Arc::new(watchlist_scheduler.clone()),
    ));
    let ingest_queue = IngestQueue::start(ingest_service);

    Ok(Arc::new(AppState {
        ownership_service,
        collection_service,
        watchlist_provider,
        watchlist_scheduler,
        ingest_queue,
        webhook_auth_header: config.webhook_auth_header.clone(),
        admin_key: config.admin_key.clone(),
    }))
}

fn build_provider(config: &Config) -> anyhow::Result<Arc<dyn WatchlistProviderTrait>> {
    let provider = &config.provider;
    match (provider.api_key.as_deref(), provider.webhook_id.as_deref()) {
        (Some(api_key), Some(webhook_id)) => {
            let client = WebhookApiClient::new(
                &provider.api_url,
                api_key,
                webhook_id,
                provider.auth_header.clone(),
            )?;
            tracing::info!(
                "Watch-list updates go to webhook {} at {}",
                webhook_id,
                provider.api_url
            );
            Ok(Arc::new(client))
        }
        _ => {
            tracing::warn!(
                "HS_PROVIDER_API_KEY / HS_PROVIDER_WEBHOOK_ID not set; watch-list updates stay in memory"
            );
            Ok(Arc::new(InMemoryWatchlistProvider::new()))
        }
    }
}

/// Registers the configured mints. Already tracked mints are left alone.
async fn seed_collection(
    config: &Config,
    collection_service: &dyn CollectionServiceTrait,
) -> anyhow::Result<()> {
    let mut mints: Vec<NewTrackedMint> = config
        .collection_mints
        .iter()
        .map(NewTrackedMint::new)
        .collect();

    if let Some(path) = &config.collection_mints_file {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let from_file = parse_mint_list(&raw)
            .with_context(|| format!("Invalid mint list in {}", path.display()))?;
        mints.extend(from_file);
    }

    if mints.is_empty() {
        tracing::warn!("No collection mints configured for seeding");
        return Ok(());
    }

    let added = collection_service.register_mints(mints).await?;
    tracing::info!("Collection seeded: {} new mint(s)", added);
    Ok(())
}
