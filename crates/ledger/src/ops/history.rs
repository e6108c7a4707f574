//! Read-only access to the ledger history.

use sea_orm::{Condition, QueryFilter, QueryOrder, QuerySelect, prelude::*};

use crate::{Entry, LedgerError, Page, ResultLedger, Transfer, TransferListFilter, entries, transfers};

use super::Ledger;

impl Ledger {
    pub async fn entry(&self, id: i64) -> ResultLedger<Entry> {
        entries::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .map(Entry::from)
            .ok_or_else(|| LedgerError::NotFound(format!("entry {id}")))
    }

    /// Entries of one account, oldest first.
    pub async fn list_entries(&self, account_id: i64, page: Page) -> ResultLedger<Vec<Entry>> {
        page.validate()?;
        let models = entries::Entity::find()
            .filter(entries::Column::AccountId.eq(account_id))
            .order_by_asc(entries::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Entry::from).collect())
    }

    /// A single transfer record by id.
    pub async fn transfer_record(&self, id: i64) -> ResultLedger<Transfer> {
        transfers::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .map(Transfer::from)
            .ok_or_else(|| LedgerError::NotFound(format!("transfer {id}")))
    }

    /// Transfers leaving `filter.from_account_id` or reaching
    /// `filter.to_account_id`, oldest first.
    pub async fn list_transfers(
        &self,
        filter: TransferListFilter,
        page: Page,
    ) -> ResultLedger<Vec<Transfer>> {
        page.validate()?;
        if filter.from_account_id.is_none() && filter.to_account_id.is_none() {
            return Err(LedgerError::InvalidArgument(
                "at least one of from_account_id/to_account_id is required".to_string(),
            ));
        }

        let mut cond = Condition::any();
        if let Some(from) = filter.from_account_id {
            cond = cond.add(transfers::Column::FromAccountId.eq(from));
        }
        if let Some(to) = filter.to_account_id {
            cond = cond.add(transfers::Column::ToAccountId.eq(to));
        }

        let models = transfers::Entity::find()
            .filter(cond)
            .order_by_asc(transfers::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Transfer::from).collect())
    }
}
