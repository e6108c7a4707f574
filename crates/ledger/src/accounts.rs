//! The module contains the `Account` struct and its table.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::{Currency, LedgerError};

/// A bank account.
///
/// Owned by exactly one user and holding a single currency. The balance is
/// expressed in minor units and is never negative: the `accounts` table
/// carries a `CHECK (balance >= 0)` constraint, so a write that would take it
/// below zero fails inside the database instead of being pre-computed here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: i64,
    pub owner: String,
    pub balance: i64,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner: String,
    pub balance: i64,
    pub currency: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::Owner",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
    #[sea_orm(has_many = "super::entries::Entity")]
    Entries,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Account {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let currency = Currency::try_from(model.currency.as_str()).map_err(|_| {
            LedgerError::internal(format!(
                "account {} stores an unknown currency: {}",
                model.id, model.currency
            ))
        })?;
        Ok(Self {
            id: model.id,
            owner: model.owner,
            balance: model.balance,
            currency,
            created_at: model.created_at,
        })
    }
}
