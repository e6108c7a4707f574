//! Double-entry banking ledger on top of a relational store.
//!
//! The heart of the crate is [`Ledger::transfer`]: it moves funds between two
//! accounts in a single database transaction, touching the accounts in
//! ascending id order so that concurrent transfers never deadlock, and leaves
//! one [`Transfer`] plus two [`Entry`] rows behind whose amounts sum to zero.
//!
//! Storage primitives the transfer is built from are public too:
//! [`accessor`] reads, locks and updates account rows, [`writer`] appends
//! history rows, and [`Ledger::with_tx`] runs a block as one atomic unit.
//! Balance and amount invariants are table constraints declared by the
//! `migration` crate; violations come back as
//! [`LedgerError::ConstraintViolation`].

pub use accounts::Account;
pub use commands::{CreateAccountCmd, CreateUserCmd, Page, TransferCmd, TransferListFilter};
pub use currency::Currency;
pub use entries::Entry;
pub use error::LedgerError;
pub use ops::{Ledger, LedgerBuilder, TxFuture, accessor, writer};
pub use transfers::{Transfer, TransferResult};
pub use users::User;

mod accounts;
mod commands;
mod constraints;
mod currency;
mod entries;
mod error;
mod ops;
pub mod password;
mod transfers;
mod users;

pub type ResultLedger<T> = Result<T, LedgerError>;
