//! Caller-side checks in front of the ledger.
//!
//! The ledger assumes both accounts of a transfer hold the requested currency
//! and that the caller may debit the source account. These checks live here.

use ledger::{Account, Currency, Ledger, TransferCmd, TransferResult};

use crate::error::{AppError, Result};

/// Fetch `account_id` and make sure it holds `currency`.
pub async fn valid_account(ledger: &Ledger, account_id: i64, currency: Currency) -> Result<Account> {
    let account = ledger.account(account_id).await?;
    if account.currency != currency {
        return Err(AppError::Rejected(format!(
            "account {account_id} currency mismatch: expected {currency}, got {}",
            account.currency
        )));
    }
    Ok(account)
}

/// Validate a transfer request and hand it to the ledger.
///
/// `acting_user`, when present, must own the source account.
pub async fn create_transfer(
    ledger: &Ledger,
    cmd: TransferCmd,
    currency: Currency,
    acting_user: Option<&str>,
) -> Result<TransferResult> {
    let from_account = valid_account(ledger, cmd.from_account_id, currency).await?;
    if let Some(user) = acting_user
        && from_account.owner != user
    {
        return Err(AppError::Unauthorized(format!(
            "from account {} does not belong to {user}",
            cmd.from_account_id
        )));
    }
    valid_account(ledger, cmd.to_account_id, currency).await?;

    let result = ledger.transfer(cmd).await?;
    tracing::info!(
        transfer_id = result.transfer.id,
        from = cmd.from_account_id,
        to = cmd.to_account_id,
        amount = cmd.amount,
        "transfer completed"
    );
    Ok(result)
}
