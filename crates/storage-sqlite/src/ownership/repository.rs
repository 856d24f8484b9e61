use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;

use holdersync_core::ownership::{OwnershipRecord, OwnershipRepositoryTrait};
use holdersync_core::Result;

use super::model::OwnershipRecordDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::ownership_records;
use crate::schema::ownership_records::dsl::*;

pub struct OwnershipRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl OwnershipRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        OwnershipRepository { pool, writer }
    }
}

#[async_trait]
impl OwnershipRepositoryTrait for OwnershipRepository {
    fn find_owner_by_mint(&self, mint_id: &str) -> Result<Option<OwnershipRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let row = ownership_records
            .find(mint_id)
            .select(OwnershipRecordDB::as_select())
            .first::<OwnershipRecordDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(OwnershipRecord::from))
    }

    async fn delete_owner_by_mint_and_wallet(&self, mint_id: &str, wallet: &str) -> Result<usize> {
        let mint_id = mint_id.to_string();
        let wallet = wallet.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(
                    ownership_records
                        .filter(mint.eq(&mint_id))
                        .filter(owner_wallet.eq(&wallet)),
                )
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
    }

    async fn upsert_owner(&self, record: OwnershipRecord) -> Result<bool> {
        let row = OwnershipRecordDB::from(record);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let existing = ownership_records
                    .find(&row.mint)
                    .select(updated_at)
                    .first::<NaiveDateTime>(conn)
                    .optional()
                    .map_err(StorageError::from)?;

                if existing.is_some_and(|current| current > row.updated_at) {
                    debug!("Keeping newer ownership record for {}", row.mint);
                    return Ok(false);
                }

                diesel::insert_into(ownership_records::table)
                    .values(&row)
                    .on_conflict(mint)
                    .do_update()
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(true)
            })
            .await
    }

    fn exists_owner_by_wallet(&self, wallet: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let found = diesel::select(diesel::dsl::exists(
            ownership_records.filter(owner_wallet.eq(wallet)),
        ))
        .get_result::<bool>(&mut conn)
        .map_err(StorageError::from)?;
        Ok(found)
    }

    fn list_distinct_owner_wallets(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        let wallets = ownership_records
            .select(owner_wallet)
            .distinct()
            .order(owner_wallet.asc())
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(wallets)
    }
}
