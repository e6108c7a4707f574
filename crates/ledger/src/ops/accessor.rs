//! Account row access: plain reads, locking reads and balance updates.
//!
//! Every function is generic over [`ConnectionTrait`], so it can run directly
//! on the connection (informational reads) or inside a transaction opened by
//! [`Ledger::with_tx`](crate::Ledger::with_tx).

use sea_orm::{
    ConnectionTrait, DbBackend, QueryFilter, QuerySelect, Select, prelude::*, sea_query::Expr,
};

use crate::{Account, LedgerError, ResultLedger, accounts};

fn not_found(id: i64) -> LedgerError {
    LedgerError::NotFound(format!("account {id}"))
}

/// Return the current row for account `id`.
///
/// Takes no lock: outside a transaction the balance may change right after
/// it is read.
pub async fn get<C: ConnectionTrait>(db: &C, id: i64) -> ResultLedger<Account> {
    let model = accounts::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found(id))?;
    Account::try_from(model)
}

/// Same as [`get`], but locks the row until the enclosing transaction ends.
///
/// Emits `SELECT ... FOR UPDATE` on backends with row locks. SQLite has no
/// row locks and drops that clause, and a plain read there only takes a shared
/// lock that cannot be upgraded while another writer waits. So on SQLite the
/// row is first touched with a no-op `UPDATE`, which acquires the database
/// write lock (waiting on the busy timeout) before the read.
pub async fn get_for_update<C: ConnectionTrait>(db: &C, id: i64) -> ResultLedger<Account> {
    if db.get_database_backend() == DbBackend::Sqlite {
        let touched = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).into(),
            )
            .filter(accounts::Column::Id.eq(id))
            .exec(db)
            .await?;
        if touched.rows_affected == 0 {
            return Err(not_found(id));
        }
        return get(db, id).await;
    }

    let model = locking_select(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found(id))?;
    Account::try_from(model)
}

fn locking_select(id: i64) -> Select<accounts::Entity> {
    accounts::Entity::find_by_id(id).lock_exclusive()
}

/// Apply `balance = balance + delta` as a single statement and return the
/// updated row.
///
/// The addition happens inside the database, so there is no read-modify-write
/// gap, and the `CHECK (balance >= 0)` constraint is evaluated on the same
/// statement: a debit larger than the balance fails with
/// [`LedgerError::ConstraintViolation`] and writes nothing.
pub async fn change_balance<C: ConnectionTrait>(
    db: &C,
    id: i64,
    delta: i64,
) -> ResultLedger<Account> {
    let updated = accounts::Entity::update_many()
        .col_expr(
            accounts::Column::Balance,
            Expr::col(accounts::Column::Balance).add(delta),
        )
        .filter(accounts::Column::Id.eq(id))
        .exec(db)
        .await
        .map_err(|err| match LedgerError::from(err) {
            LedgerError::ConstraintViolation(detail) => LedgerError::ConstraintViolation(
                format!("balance of account {id} cannot go below zero ({detail})"),
            ),
            other => other,
        })?;
    if updated.rows_affected == 0 {
        return Err(not_found(id));
    }
    // Inside a transaction the row is write-locked from here on, so the
    // re-read sees exactly the value just written.
    get(db, id).await
}
