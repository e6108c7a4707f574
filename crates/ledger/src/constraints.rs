//! Storage-boundary error mapping.
//!
//! The invariants themselves (non-negative balance, positive transfer amount,
//! distinct accounts, referential integrity) are declared in the schema by the
//! `migration` crate and checked by the database on every write. This module
//! only turns the resulting driver errors into a [`LedgerError`] kind; it never
//! tries to repair a violation.

use sea_orm::{
    ConnAcquireErr, DbErr, RuntimeErr, SqlErr,
    sqlx::{self, error::ErrorKind},
};

use crate::LedgerError;

/// PostgreSQL SQLSTATEs that mean "the same statement may succeed later":
/// serialization failure, deadlock detected, lock not available, query canceled.
const PG_RETRYABLE: &[&str] = &["40001", "40P01", "55P03", "57014"];

/// Primary SQLite result codes for `SQLITE_BUSY` and `SQLITE_LOCKED`.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

pub(crate) fn classify(err: &DbErr) -> LedgerError {
    if let Some(sql_err) = err.sql_err() {
        match sql_err {
            SqlErr::UniqueConstraintViolation(msg) => {
                return LedgerError::ConstraintViolation(format!("unique constraint: {msg}"));
            }
            SqlErr::ForeignKeyConstraintViolation(msg) => {
                return LedgerError::ConstraintViolation(format!("foreign key: {msg}"));
            }
            _ => {}
        }
    }

    match err {
        DbErr::RecordNotFound(what) => LedgerError::NotFound(what.clone()),
        DbErr::ConnectionAcquire(ConnAcquireErr::Timeout) => {
            LedgerError::retryable("timed out acquiring a database connection")
        }
        DbErr::Conn(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx_err)) => classify_sqlx(sqlx_err),
        other => LedgerError::internal(other.to_string()),
    }
}

fn classify_sqlx(err: &sqlx::Error) -> LedgerError {
    match err {
        sqlx::Error::Database(db_err) => {
            let message = db_err.message().to_string();
            match db_err.kind() {
                ErrorKind::CheckViolation
                | ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation => LedgerError::ConstraintViolation(message),
                _ if is_check_message(&message) => LedgerError::ConstraintViolation(message),
                _ => match db_err.code() {
                    Some(code) if is_retryable_code(&code) => LedgerError::retryable(message),
                    _ => LedgerError::internal(message),
                },
            }
        }
        sqlx::Error::PoolTimedOut => {
            LedgerError::retryable("timed out acquiring a database connection")
        }
        other => LedgerError::internal(other.to_string()),
    }
}

fn is_check_message(message: &str) -> bool {
    message.contains("CHECK constraint failed") || message.contains("violates check constraint")
}

fn is_retryable_code(code: &str) -> bool {
    if PG_RETRYABLE.contains(&code) {
        return true;
    }
    // SQLite reports extended result codes; the primary code is the low byte.
    // SQLSTATEs are always five characters, so they never reach this branch.
    code.len() <= 4
        && code
            .parse::<i32>()
            .is_ok_and(|c| matches!(c & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_contention_codes_are_retryable() {
        assert!(is_retryable_code("40001"));
        assert!(is_retryable_code("40P01"));
        assert!(is_retryable_code("55P03"));
        assert!(!is_retryable_code("23514"));
        // 42501 & 0xff == 5, must not be mistaken for SQLITE_BUSY.
        assert!(!is_retryable_code("42501"));
    }

    #[test]
    fn sqlite_busy_and_locked_are_retryable() {
        assert!(is_retryable_code("5"));
        assert!(is_retryable_code("6"));
        assert!(is_retryable_code("517"));
        assert!(is_retryable_code("262"));
        assert!(!is_retryable_code("275"));
        assert!(!is_retryable_code("19"));
    }

    #[test]
    fn check_messages_from_both_backends() {
        assert!(is_check_message("CHECK constraint failed: balance >= 0"));
        assert!(is_check_message(
            "new row for relation \"accounts\" violates check constraint \"accounts_balance_check\""
        ));
        assert!(!is_check_message("database is locked"));
    }

    #[test]
    fn record_not_found_maps_to_not_found() {
        let err = LedgerError::from(DbErr::RecordNotFound("account 7".to_string()));
        assert_eq!(err, LedgerError::NotFound("account 7".to_string()));
    }

    #[test]
    fn acquire_timeout_is_retryable() {
        let err = LedgerError::from(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout));
        assert!(err.is_retryable());
    }

    #[test]
    fn other_errors_are_internal_and_final() {
        let err = LedgerError::from(DbErr::Custom("boom".to_string()));
        assert!(matches!(err, LedgerError::Internal { .. }));
        assert!(!err.is_retryable());
    }
}
