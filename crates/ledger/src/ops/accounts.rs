use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, QuerySelect, prelude::*};

use crate::{Account, CreateAccountCmd, LedgerError, Page, ResultLedger, accounts};

use super::{Ledger, accessor};

impl Ledger {
    /// Open a new account.
    ///
    /// The owner must exist and may hold at most one account per currency;
    /// both rules are table constraints and surface as
    /// [`LedgerError::ConstraintViolation`].
    pub async fn create_account(&self, cmd: CreateAccountCmd) -> ResultLedger<Account> {
        let owner = cmd.owner.trim().to_string();
        if owner.is_empty() {
            return Err(LedgerError::InvalidArgument(
                "owner must not be empty".to_string(),
            ));
        }
        if cmd.balance < 0 {
            return Err(LedgerError::InvalidArgument(
                "opening balance must be >= 0".to_string(),
            ));
        }

        let model = accounts::ActiveModel {
            id: ActiveValue::NotSet,
            owner: ActiveValue::Set(owner),
            balance: ActiveValue::Set(cmd.balance),
            currency: ActiveValue::Set(cmd.currency.code().to_string()),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&self.database)
        .await?;
        let account = Account::try_from(model)?;
        tracing::info!(
            account_id = account.id,
            owner = %account.owner,
            currency = %account.currency,
            "account created"
        );
        Ok(account)
    }

    /// Return an account snapshot from DB, without locking it.
    pub async fn account(&self, id: i64) -> ResultLedger<Account> {
        accessor::get(&self.database, id).await
    }

    /// List the accounts of `owner`, oldest first.
    pub async fn list_accounts(&self, owner: &str, page: Page) -> ResultLedger<Vec<Account>> {
        page.validate()?;
        accounts::Entity::find()
            .filter(accounts::Column::Owner.eq(owner))
            .order_by_asc(accounts::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }
}
