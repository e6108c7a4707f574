use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, prelude::*, sea_query::Expr};

use crate::{CreateUserCmd, LedgerError, ResultLedger, User, password, users};

use super::Ledger;

fn normalize_required(value: &str, label: &str) -> ResultLedger<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidArgument(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

impl Ledger {
    /// Register a user. Usernames and emails are unique; the password is
    /// stored as an argon2 hash.
    pub async fn create_user(&self, cmd: CreateUserCmd) -> ResultLedger<User> {
        let username = normalize_required(&cmd.username, "username")?;
        let full_name = normalize_required(&cmd.full_name, "full_name")?;
        let email = normalize_required(&cmd.email, "email")?;
        if !email.contains('@') {
            return Err(LedgerError::InvalidArgument(format!(
                "invalid email: {email}"
            )));
        }
        let hashed_password = password::hash_password(&cmd.password)?;

        let model = users::ActiveModel {
            username: ActiveValue::Set(username),
            full_name: ActiveValue::Set(full_name),
            email: ActiveValue::Set(email),
            hashed_password: ActiveValue::Set(hashed_password),
            password_changed_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&self.database)
        .await?;
        tracing::info!(username = %model.username, "user created");
        Ok(User::from(model))
    }

    pub async fn user(&self, username: &str) -> ResultLedger<User> {
        users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| LedgerError::NotFound(format!("user {username}")))
    }

    /// Whether `candidate` is the current password of `username`.
    pub async fn check_password(&self, username: &str, candidate: &str) -> ResultLedger<bool> {
        let user = self.user(username).await?;
        password::check_password(candidate, &user.hashed_password)
    }

    /// Replace the password of `username` and stamp `password_changed_at`.
    pub async fn change_password(&self, username: &str, new_password: &str) -> ResultLedger<User> {
        let hashed_password = password::hash_password(new_password)?;
        let updated = users::Entity::update_many()
            .col_expr(users::Column::HashedPassword, Expr::value(hashed_password))
            .col_expr(users::Column::PasswordChangedAt, Expr::value(Some(Utc::now())))
            .filter(users::Column::Username.eq(username))
            .exec(&self.database)
            .await?;
        if updated.rows_affected == 0 {
            return Err(LedgerError::NotFound(format!("user {username}")));
        }
        tracing::info!(username, "password changed");
        self.user(username).await
    }
}
