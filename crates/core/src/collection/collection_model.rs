//! Tracked collection domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A mint that belongs to the monitored collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedMint {
    pub mint: String,
    pub name: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Input model for registering a mint.
///
/// Deserializes from either a bare mint string or a `{ "mint", "name" }` object,
/// which is the shape accepted by the seed file and the admin endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "NewTrackedMintInput")]
pub struct NewTrackedMint {
    pub mint: String,
    pub name: Option<String>,
}

impl NewTrackedMint {
    pub fn new(mint: impl Into<String>) -> Self {
        Self {
            mint: mint.into(),
            name: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NewTrackedMintInput {
    Bare(String),
    Named { mint: String, name: Option<String> },
}

impl From<NewTrackedMintInput> for NewTrackedMint {
    fn from(input: NewTrackedMintInput) -> Self {
        match input {
            NewTrackedMintInput::Bare(mint) => NewTrackedMint { mint, name: None },
            NewTrackedMintInput::Named { mint, name } => NewTrackedMint { mint, name },
        }
    }
}
