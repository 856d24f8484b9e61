//! Database models for the tracked collection.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use holdersync_core::collection::{NewTrackedMint, TrackedMint};

#[derive(Queryable, Selectable, Identifiable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::tracked_mints)]
#[diesel(primary_key(mint))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TrackedMintDB {
    pub mint: String,
    pub name: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::tracked_mints)]
pub struct NewTrackedMintDB {
    pub mint: String,
    pub name: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<TrackedMintDB> for TrackedMint {
    fn from(db: TrackedMintDB) -> Self {
        TrackedMint {
            mint: db.mint,
            name: db.name,
            created_at: db.created_at,
        }
    }
}

impl NewTrackedMintDB {
    pub fn from_domain(new_mint: NewTrackedMint, created_at: NaiveDateTime) -> Self {
        NewTrackedMintDB {
            mint: new_mint.mint,
            name: new_mint.name,
            created_at,
        }
    }
}
