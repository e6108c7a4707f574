//! The transfer coordinator.
//!
//! A transfer debits one account, credits another and appends one
//! [`Transfer`](crate::Transfer) plus two [`Entry`](crate::Entry) rows, all in
//! one database transaction.
//!
//! ## Lock order
//!
//! The two accounts are always touched in ascending id order, whatever the
//! direction of the transfer. Two concurrent transfers `A -> B` and `B -> A`
//! therefore both wait on the lower id first and can never hold one row each
//! while waiting for the other. No deadlock detector or retry loop is needed.

use std::time::Duration;

use sea_orm::DatabaseTransaction;

use crate::{Account, LedgerError, ResultLedger, TransferCmd, TransferResult};

use super::{Ledger, accessor, writer};

/// One side of a transfer: the account and the signed change to its balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct BalanceChange {
    account_id: i64,
    delta: i64,
}

/// Debit and credit, sorted by ascending account id.
fn lock_order(cmd: &TransferCmd) -> [BalanceChange; 2] {
    let debit = BalanceChange {
        account_id: cmd.from_account_id,
        delta: -cmd.amount,
    };
    let credit = BalanceChange {
        account_id: cmd.to_account_id,
        delta: cmd.amount,
    };
    if debit.account_id < credit.account_id {
        [debit, credit]
    } else {
        [credit, debit]
    }
}

async fn apply_change(
    db_tx: &DatabaseTransaction,
    change: BalanceChange,
    explicit_row_locks: bool,
) -> ResultLedger<Account> {
    if explicit_row_locks {
        accessor::get_for_update(db_tx, change.account_id).await?;
    }
    accessor::change_balance(db_tx, change.account_id, change.delta).await
}

impl Ledger {
    /// Move funds between two accounts atomically.
    ///
    /// Fails with [`LedgerError::InvalidArgument`] without touching storage when
    /// the accounts are the same or `amount <= 0`. Once the transaction is
    /// open, any failure rolls back everything:
    /// - unknown account: [`LedgerError::NotFound`];
    /// - debit larger than the balance: [`LedgerError::ConstraintViolation`];
    /// - storage failure, lock timeout, expired deadline:
    ///   [`LedgerError::Internal`].
    ///
    /// The default deadline configured on the builder, if any, applies.
    pub async fn transfer(&self, cmd: TransferCmd) -> ResultLedger<TransferResult> {
        match self.transfer_timeout {
            Some(deadline) => self.transfer_with_deadline(cmd, deadline).await,
            None => self.run_transfer(cmd).await,
        }
    }

    /// Like [`Ledger::transfer`], but gives up after `deadline`.
    ///
    /// On expiry the in-flight transaction is dropped and rolled back, and the
    /// call fails with a retryable [`LedgerError::Internal`].
    pub async fn transfer_with_deadline(
        &self,
        cmd: TransferCmd,
        deadline: Duration,
    ) -> ResultLedger<TransferResult> {
        match tokio::time::timeout(deadline, self.run_transfer(cmd)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    from = cmd.from_account_id,
                    to = cmd.to_account_id,
                    amount = cmd.amount,
                    "transfer deadline expired, rolled back"
                );
                Err(LedgerError::retryable(format!(
                    "transfer did not complete within {} ms",
                    deadline.as_millis()
                )))
            }
        }
    }

    async fn run_transfer(&self, cmd: TransferCmd) -> ResultLedger<TransferResult> {
        cmd.validate()?;
        tracing::debug!(
            from = cmd.from_account_id,
            to = cmd.to_account_id,
            amount = cmd.amount,
            "transfer started"
        );

        let explicit_row_locks = self.explicit_row_locks;
        let result = self
            .with_tx(move |_, db_tx| {
                Box::pin(async move {
                    let [first, second] = lock_order(&cmd);
                    let first_account = apply_change(db_tx, first, explicit_row_locks).await?;
                    let second_account = apply_change(db_tx, second, explicit_row_locks).await?;
                    let (from_account, to_account) =
                        if first.account_id == cmd.from_account_id {
                            (first_account, second_account)
                        } else {
                            (second_account, first_account)
                        };

                    let transfer = writer::create_transfer(
                        db_tx,
                        cmd.from_account_id,
                        cmd.to_account_id,
                        cmd.amount,
                    )
                    .await?;
                    let from_entry =
                        writer::create_entry(db_tx, cmd.from_account_id, -cmd.amount).await?;
                    let to_entry =
                        writer::create_entry(db_tx, cmd.to_account_id, cmd.amount).await?;

                    Ok(TransferResult {
                        transfer,
                        from_entry,
                        to_entry,
                        from_account,
                        to_account,
                    })
                })
            })
            .await?;

        tracing::debug!(transfer_id = result.transfer.id, "transfer committed");
        Ok(result)
    }
}
