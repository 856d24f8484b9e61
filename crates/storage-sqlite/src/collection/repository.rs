use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;

use holdersync_core::collection::{CollectionRepositoryTrait, NewTrackedMint, TrackedMint};
use holdersync_core::Result;

use super::model::{NewTrackedMintDB, TrackedMintDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::tracked_mints;
use crate::utils::chunk_for_sqlite;

pub struct CollectionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CollectionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        CollectionRepository { pool, writer }
    }
}

#[async_trait]
impl CollectionRepositoryTrait for CollectionRepository {
    fn exists_tracked_mint(&self, mint: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let found = diesel::select(diesel::dsl::exists(
            tracked_mints::table.filter(tracked_mints::mint.eq(mint)),
        ))
        .get_result::<bool>(&mut conn)
        .map_err(StorageError::from)?;
        Ok(found)
    }

    fn list_tracked_mints(&self) -> Result<Vec<TrackedMint>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = tracked_mints::table
            .select(TrackedMintDB::as_select())
            .order(tracked_mints::mint.asc())
            .load::<TrackedMintDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(TrackedMint::from).collect())
    }

    fn count_tracked_mints(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        let count = tracked_mints::table
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(count)
    }

    async fn register_mints(&self, mints: Vec<NewTrackedMint>) -> Result<usize> {
        let created_at = Utc::now().naive_utc();
        let rows: Vec<NewTrackedMintDB> = mints
            .into_iter()
            .map(|m| NewTrackedMintDB::from_domain(m, created_at))
            .collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut inserted = 0;
                for chunk in chunk_for_sqlite(&rows) {
                    inserted += diesel::insert_or_ignore_into(tracked_mints::table)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(inserted)
            })
            .await
    }
}
