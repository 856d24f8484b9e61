use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use super::collection_model::{NewTrackedMint, TrackedMint};
use super::collection_traits::{CollectionRepositoryTrait, CollectionServiceTrait};
use crate::errors::{Error, Result, ValidationError};

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

pub struct CollectionService {
    repository: Arc<dyn CollectionRepositoryTrait>,
}

impl CollectionService {
    pub fn new(repository: Arc<dyn CollectionRepositoryTrait>) -> Self {
        CollectionService { repository }
    }

    /// Trims, validates and de-duplicates mints before they reach storage.
    fn normalize(mints: Vec<NewTrackedMint>) -> Result<Vec<NewTrackedMint>> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(mints.len());
        for entry in mints {
            let mint = entry.mint.trim().to_string();
            if mint.is_empty() {
                return Err(Error::Validation(ValidationError::MissingField(
                    "mint".to_string(),
                )));
            }
            if !mint.chars().all(|c| BASE58_ALPHABET.contains(c)) {
                return Err(Error::Validation(ValidationError::InvalidInput(format!(
                    "Mint '{}' is not a base58 address",
                    mint
                ))));
            }
            if seen.insert(mint.clone()) {
                normalized.push(NewTrackedMint {
                    mint,
                    name: entry
                        .name
                        .map(|n| n.trim().to_string())
                        .filter(|n| !n.is_empty()),
                });
            }
        }
        Ok(normalized)
    }
}

#[async_trait]
impl CollectionServiceTrait for CollectionService {
    fn list_mints(&self) -> Result<Vec<TrackedMint>> {
        self.repository.list_tracked_mints()
    }

    fn is_tracked(&self, mint: &str) -> Result<bool> {
        self.repository.exists_tracked_mint(mint)
    }

    async fn register_mints(&self, mints: Vec<NewTrackedMint>) -> Result<usize> {
        let mints = Self::normalize(mints)?;
        if mints.is_empty() {
            debug!("No mints to register");
            return Ok(0);
        }
        let requested = mints.len();
        let added = self.repository.register_mints(mints).await?;
        info!(
            "Registered {} new mint(s) ({} already tracked)",
            added,
            requested - added
        );
        Ok(added)
    }
}

/// Parses a seed list: a JSON array of mint strings or `{ "mint", "name" }` objects.
pub fn parse_mint_list(json: &str) -> Result<Vec<NewTrackedMint>> {
    let mints: Vec<NewTrackedMint> = serde_json::from_str(json)?;
    Ok(mints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockCollectionRepository {
        mints: Mutex<Vec<TrackedMint>>,
    }

    #[async_trait]
    impl CollectionRepositoryTrait for MockCollectionRepository {
        fn exists_tracked_mint(&self, mint: &str) -> Result<bool> {
            Ok(self.mints.lock().unwrap().iter().any(|m| m.mint == mint))
        }

        fn list_tracked_mints(&self) -> Result<Vec<TrackedMint>> {
            Ok(self.mints.lock().unwrap().clone())
        }

        fn count_tracked_mints(&self) -> Result<i64> {
            Ok(self.mints.lock().unwrap().len() as i64)
        }

        async fn register_mints(&self, mints: Vec<NewTrackedMint>) -> Result<usize> {
            let mut stored = self.mints.lock().unwrap();
            let mut added = 0;
            for m in mints {
                if stored.iter().all(|s| s.mint != m.mint) {
                    stored.push(TrackedMint {
                        mint: m.mint,
                        name: m.name,
                        created_at: Utc::now().naive_utc(),
                    });
                    added += 1;
                }
            }
            Ok(added)
        }
    }

    #[test]
    fn test_parse_mint_list_accepts_strings_and_objects() {
        let parsed = parse_mint_list(
            r#"["Mint1111", {"mint": "Mint2222", "name": "Pirate #2"}, {"mint": "Mint3333"}]"#,
        )
        .unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0], NewTrackedMint::new("Mint1111"));
        assert_eq!(parsed[1].name.as_deref(), Some("Pirate #2"));
        assert_eq!(parsed[2].name, None);
    }

    #[test]
    fn test_parse_mint_list_rejects_non_array() {
        assert!(parse_mint_list(r#"{"mint": "Mint1111"}"#).is_err());
    }

    #[tokio::test]
    async fn test_register_mints_dedups_and_trims() {
        let repo = Arc::new(MockCollectionRepository::default());
        let service = CollectionService::new(repo.clone());

        let added = service
            .register_mints(vec![
                NewTrackedMint::new(" Mint1111 "),
                NewTrackedMint::new("Mint1111"),
                NewTrackedMint::new("Mint2222"),
            ])
            .await
            .unwrap();

        assert_eq!(added, 2);
        assert!(service.is_tracked("Mint1111").unwrap());
        assert_eq!(repo.count_tracked_mints().unwrap(), 2);

        let again = service
            .register_mints(vec![NewTrackedMint::new("Mint2222")])
            .await
            .unwrap();
        assert_eq!(again, 0);
    }

    #[tokio::test]
    async fn test_register_mints_rejects_invalid_address() {
        let service = CollectionService::new(Arc::new(MockCollectionRepository::default()));
        let err = service
            .register_mints(vec![NewTrackedMint::new("not/base58!")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = service
            .register_mints(vec![NewTrackedMint::new("   ")])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::MissingField(_))
        ));
    }
}
