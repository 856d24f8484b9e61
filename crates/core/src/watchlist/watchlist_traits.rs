use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::errors::Result;

/// The provider's address watch-list.
///
/// The provider replaces the whole list on update; it never appends.
#[async_trait]
pub trait WatchlistProviderTrait: Send + Sync {
    async fn list_watched_addresses(&self) -> Result<Vec<String>>;
    async fn replace_watched_addresses(&self, addresses: &[String]) -> Result<()>;

    /// Makes the watch-list equal to `addresses`, skipping the replace when it
    /// already is. Returns whether a replace was sent.
    async fn sync_watched_addresses(&self, addresses: &[String]) -> Result<bool> {
        let current = self.list_watched_addresses().await?;
        if same_addresses(&current, addresses) {
            return Ok(false);
        }
        self.replace_watched_addresses(addresses).await?;
        Ok(true)
    }
}

/// Order- and duplicate-insensitive comparison of two address lists.
pub fn same_addresses(a: &[String], b: &[String]) -> bool {
    let a: BTreeSet<&String> = a.iter().collect();
    let b: BTreeSet<&String> = b.iter().collect();
    a == b
}

/// Receives newly discovered holder addresses.
///
/// `add_new_owners()` must be fast and non-blocking; implementations queue the
/// addresses for asynchronous reconciliation.
pub trait NewOwnerSink: Send + Sync {
    fn add_new_owners(&self, addresses: Vec<String>);
}
