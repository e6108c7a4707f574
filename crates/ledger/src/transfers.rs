//! Transfer records.
//!
//! A [`Transfer`] is one logical movement of funds between two distinct
//! accounts. It is always written together with its two [`Entry`] rows, in the
//! same database transaction.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::{Account, Entry};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub id: i64,
    pub from_account_id: i64,
    pub to_account_id: i64,
    /// Always `> 0`, in minor units.
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Everything a successful transfer produced, as committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransferResult {
    pub transfer: Transfer,
    pub from_entry: Entry,
    pub to_entry: Entry,
    pub from_account: Account,
    pub to_account: Account,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::FromAccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    FromAccount,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::ToAccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    ToAccount,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Transfer {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            from_account_id: model.from_account_id,
            to_account_id: model.to_account_id,
            amount: model.amount,
            created_at: model.created_at,
        }
    }
}
