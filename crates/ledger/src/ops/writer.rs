//! Append-only writes to the ledger history.
//!
//! Only inserts live here. `id` is assigned by the database and `created_at`
//! by the writer at insert time; neither is ever changed afterwards.

use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, prelude::*};

use crate::{Entry, ResultLedger, Transfer, entries, transfers};

/// Insert a transfer record.
///
/// `amount > 0` and `from != to` are enforced by table constraints, not here.
pub async fn create_transfer<C: ConnectionTrait>(
    db: &C,
    from_account_id: i64,
    to_account_id: i64,
    amount: i64,
) -> ResultLedger<Transfer> {
    let model = transfers::ActiveModel {
        id: ActiveValue::NotSet,
        from_account_id: ActiveValue::Set(from_account_id),
        to_account_id: ActiveValue::Set(to_account_id),
        amount: ActiveValue::Set(amount),
        created_at: ActiveValue::Set(Utc::now()),
    }
    .insert(db)
    .await?;
    Ok(Transfer::from(model))
}

/// Insert one signed ledger line for `account_id`.
pub async fn create_entry<C: ConnectionTrait>(
    db: &C,
    account_id: i64,
    amount: i64,
) -> ResultLedger<Entry> {
    let model = entries::ActiveModel {
        id: ActiveValue::NotSet,
        account_id: ActiveValue::Set(account_id),
        amount: ActiveValue::Set(amount),
        created_at: ActiveValue::Set(Utc::now()),
    }
    .insert(db)
    .await?;
    Ok(Entry::from(model))
}
