//! Command structs for ledger operations.
//!
//! These types group parameters for write and list operations, keeping call
//! sites readable and avoiding long argument lists.

use crate::{Currency, LedgerError, ResultLedger};

/// Move `amount` minor units from one account to another.
///
/// The caller is expected to have already checked that both accounts hold the
/// requested currency and that it may debit `from_account_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferCmd {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
}

impl TransferCmd {
    #[must_use]
    pub fn new(from_account_id: i64, to_account_id: i64, amount: i64) -> Self {
        Self {
            from_account_id,
            to_account_id,
            amount,
        }
    }

    /// Local checks, performed before any storage access.
    pub(crate) fn validate(&self) -> ResultLedger<()> {
        if self.from_account_id == self.to_account_id {
            return Err(LedgerError::InvalidArgument(
                "from_account_id and to_account_id must differ".to_string(),
            ));
        }
        if self.amount <= 0 {
            return Err(LedgerError::InvalidArgument(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Register a new user.
#[derive(Clone, Debug)]
pub struct CreateUserCmd {
    pub username: String,
    pub full_name: String,
    pub email: String,
    /// Plain-text password; only its hash is stored.
    pub password: String,
}

impl CreateUserCmd {
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        full_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            full_name: full_name.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Open a new account for `owner`.
#[derive(Clone, Debug)]
pub struct CreateAccountCmd {
    pub owner: String,
    pub currency: Currency,
    /// Opening balance in minor units (default: 0).
    pub balance: i64,
}

impl CreateAccountCmd {
    #[must_use]
    pub fn new(owner: impl Into<String>, currency: Currency) -> Self {
        Self {
            owner: owner.into(),
            currency,
            balance: 0,
        }
    }

    #[must_use]
    pub fn balance(mut self, balance: i64) -> Self {
        self.balance = balance;
        self
    }
}

/// Limit/offset pagination for list operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Page {
    pub const MAX_LIMIT: u64 = 100;

    #[must_use]
    pub fn new(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }

    /// 1-based page number and page size, as exposed by list endpoints.
    pub fn numbered(page_id: u64, page_size: u64) -> ResultLedger<Self> {
        if page_id == 0 {
            return Err(LedgerError::InvalidArgument(
                "page_id must be >= 1".to_string(),
            ));
        }
        Self::new(page_size, 0).validate()?;
        let offset = (page_id - 1).checked_mul(page_size).ok_or_else(|| {
            LedgerError::InvalidArgument(format!("page_id {page_id} is out of range"))
        })?;
        Ok(Self::new(page_size, offset))
    }

    pub(crate) fn validate(&self) -> ResultLedger<()> {
        if self.limit == 0 || self.limit > Self::MAX_LIMIT {
            return Err(LedgerError::InvalidArgument(format!(
                "limit must be between 1 and {}",
                Self::MAX_LIMIT
            )));
        }
        Ok(())
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(10, 0)
    }
}

/// Filters for listing transfers.
///
/// A transfer matches when it leaves `from_account_id` **or** reaches
/// `to_account_id`. Passing the same id for both lists every transfer that
/// touches that account.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransferListFilter {
    pub from_account_id: Option<i64>,
    pub to_account_id: Option<i64>,
}

impl TransferListFilter {
    #[must_use]
    pub fn touching(account_id: i64) -> Self {
        Self {
            from_account_id: Some(account_id),
            to_account_id: Some(account_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_account_transfer_is_invalid() {
        let err = TransferCmd::new(3, 3, 10).validate().unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));
    }

    #[test]
    fn non_positive_amount_is_invalid() {
        assert!(TransferCmd::new(1, 2, 0).validate().is_err());
        assert!(TransferCmd::new(1, 2, -5).validate().is_err());
        assert!(TransferCmd::new(1, 2, 1).validate().is_ok());
    }

    #[test]
    fn numbered_pages_translate_to_offsets() {
        assert_eq!(Page::numbered(1, 5).unwrap(), Page::new(5, 0));
        assert_eq!(Page::numbered(3, 5).unwrap(), Page::new(5, 10));
        assert!(Page::numbered(0, 5).is_err());
        assert!(Page::numbered(1, 0).is_err());
        assert!(Page::numbered(1, Page::MAX_LIMIT + 1).is_err());
    }

    #[test]
    fn huge_page_number_is_invalid_not_an_overflow() {
        let err = Page::numbered(u64::MAX, 100).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));
        assert!(Page::numbered(u64::MAX, 1).is_ok());
    }
}
