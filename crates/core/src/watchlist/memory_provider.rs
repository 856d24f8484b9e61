use std::sync::Mutex;

use async_trait::async_trait;
use log::info;

use super::watchlist_traits::WatchlistProviderTrait;
use crate::errors::{Error, Result};

/// Watch-list kept in process memory.
///
/// Used when no provider credentials are configured, so the pipeline can run
/// end to end without touching the provider.
#[derive(Default)]
pub struct InMemoryWatchlistProvider {
    addresses: Mutex<Vec<String>>,
}

impl InMemoryWatchlistProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_addresses(addresses: Vec<String>) -> Self {
        Self {
            addresses: Mutex::new(addresses),
        }
    }
}

#[async_trait]
impl WatchlistProviderTrait for InMemoryWatchlistProvider {
    async fn list_watched_addresses(&self) -> Result<Vec<String>> {
        self.addresses
            .lock()
            .map(|a| a.clone())
            .map_err(|e| Error::Unexpected(e.to_string()))
    }

    async fn replace_watched_addresses(&self, addresses: &[String]) -> Result<()> {
        let mut current = self
            .addresses
            .lock()
            .map_err(|e| Error::Unexpected(e.to_string()))?;
        info!(
            "In-memory watch-list replaced: {} -> {} address(es)",
            current.len(),
            addresses.len()
        );
        *current = addresses.to_vec();
        Ok(())
    }
}
