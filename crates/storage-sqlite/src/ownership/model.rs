//! Database model for the ownership ledger.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use holdersync_core::ownership::OwnershipRecord;

#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::ownership_records)]
#[diesel(primary_key(mint))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OwnershipRecordDB {
    pub mint: String,
    pub token_account: Option<String>,
    pub owner_wallet: String,
    pub amount: i64,
    pub updated_at: NaiveDateTime,
}

impl From<OwnershipRecordDB> for OwnershipRecord {
    fn from(db: OwnershipRecordDB) -> Self {
        OwnershipRecord {
            mint: db.mint,
            token_account: db.token_account,
            owner_wallet: db.owner_wallet,
            amount: db.amount,
            updated_at: db.updated_at,
        }
    }
}

impl From<OwnershipRecord> for OwnershipRecordDB {
    fn from(record: OwnershipRecord) -> Self {
        OwnershipRecordDB {
            mint: record.mint,
            token_account: record.token_account,
            owner_wallet: record.owner_wallet,
            amount: record.amount,
            updated_at: record.updated_at,
        }
    }
}
