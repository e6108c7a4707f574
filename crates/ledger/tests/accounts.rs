use sea_orm::Database;

use ledger::{
    CreateAccountCmd, CreateUserCmd, Currency, Ledger, LedgerError, Page, TransferCmd,
    TransferListFilter,
};
use migration::MigratorTrait;

async fn ledger_with_db() -> Ledger {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder().database(db).build().await.unwrap();
    ledger
        .create_user(CreateUserCmd::new(
            "alice",
            "Alice Liddell",
            "alice@example.com",
            "secret-pass",
        ))
        .await
        .unwrap();
    ledger
}

#[tokio::test]
async fn create_and_get_user() {
    let ledger = ledger_with_db().await;

    let user = ledger
        .create_user(CreateUserCmd::new(
            "  bob ",
            "Bob Builder",
            "bob@example.com",
            "secret-pass",
        ))
        .await
        .unwrap();
    assert_eq!(user.username, "bob");

    let fetched = ledger.user("bob").await.unwrap();
    assert_eq!(fetched, user);

    assert_eq!(
        ledger.user("nobody").await.unwrap_err(),
        LedgerError::NotFound("user nobody".to_string())
    );
}

#[tokio::test]
async fn invalid_users_are_rejected() {
    let ledger = ledger_with_db().await;

    let err = ledger
        .create_user(CreateUserCmd::new("", "Empty", "empty@example.com", "secret-pass"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidArgument(_)));

    let err = ledger
        .create_user(CreateUserCmd::new("dave", "Dave", "not-an-email", "secret-pass"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidArgument(_)));

    let err = ledger
        .create_user(CreateUserCmd::new("alice", "Other Alice", "other@example.com", "secret-pass"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::ConstraintViolation(_)));

    let err = ledger
        .create_user(CreateUserCmd::new("alice2", "Alice Again", "alice@example.com", "secret-pass"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::ConstraintViolation(_)));
}

#[tokio::test]
async fn passwords_are_hashed_and_checked() {
    let ledger = ledger_with_db().await;

    let user = ledger.user("alice").await.unwrap();
    assert_ne!(user.hashed_password, "secret-pass");
    assert!(user.hashed_password.starts_with("$argon2"));
    assert_eq!(user.password_changed_at, None);

    assert!(ledger.check_password("alice", "secret-pass").await.unwrap());
    assert!(!ledger.check_password("alice", "wrong-pass").await.unwrap());
    assert!(matches!(
        ledger.check_password("nobody", "secret-pass").await.unwrap_err(),
        LedgerError::NotFound(_)
    ));

    let json = serde_json::to_value(&user).unwrap();
    assert!(json.get("hashed_password").is_none());

    let err = ledger
        .create_user(CreateUserCmd::new("erin", "Erin", "erin@example.com", "12345"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidArgument(_)));
}

#[tokio::test]
async fn change_password_replaces_the_hash() {
    let ledger = ledger_with_db().await;
    let before = ledger.user("alice").await.unwrap();

    let after = ledger
        .change_password("alice", "brand-new-pass")
        .await
        .unwrap();
    assert_ne!(after.hashed_password, before.hashed_password);
    assert!(after.password_changed_at.is_some());

    assert!(ledger.check_password("alice", "brand-new-pass").await.unwrap());
    assert!(!ledger.check_password("alice", "secret-pass").await.unwrap());

    assert!(matches!(
        ledger.change_password("nobody", "brand-new-pass").await.unwrap_err(),
        LedgerError::NotFound(_)
    ));
    assert!(matches!(
        ledger.change_password("alice", "short").await.unwrap_err(),
        LedgerError::InvalidArgument(_)
    ));
}

#[tokio::test]
async fn create_and_get_account() {
    let ledger = ledger_with_db().await;

    let account = ledger
        .create_account(CreateAccountCmd::new("alice", Currency::Eur).balance(1234))
        .await
        .unwrap();
    assert!(account.id > 0);
    assert_eq!(account.owner, "alice");
    assert_eq!(account.currency, Currency::Eur);
    assert_eq!(account.balance, 1234);

    let fetched = ledger.account(account.id).await.unwrap();
    assert_eq!(fetched, account);

    let zero = ledger
        .create_account(CreateAccountCmd::new("alice", Currency::Cad))
        .await
        .unwrap();
    assert_eq!(zero.balance, 0);
}

#[tokio::test]
async fn account_rules_are_enforced() {
    let ledger = ledger_with_db().await;
    ledger
        .create_account(CreateAccountCmd::new("alice", Currency::Usd))
        .await
        .unwrap();

    // One account per owner and currency.
    let err = ledger
        .create_account(CreateAccountCmd::new("alice", Currency::Usd))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::ConstraintViolation(_)));

    // Owner must exist.
    let err = ledger
        .create_account(CreateAccountCmd::new("ghost", Currency::Usd))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::ConstraintViolation(_)));

    let err = ledger
        .create_account(CreateAccountCmd::new("alice", Currency::Eur).balance(-1))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidArgument(_)));

    let err = ledger
        .create_account(CreateAccountCmd::new("   ", Currency::Eur))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidArgument(_)));

    assert_eq!(
        ledger.account(9999).await.unwrap_err(),
        LedgerError::NotFound("account 9999".to_string())
    );
}

#[tokio::test]
async fn list_accounts_paginates_by_owner() {
    let ledger = ledger_with_db().await;
    ledger
        .create_user(CreateUserCmd::new("bob", "Bob", "bob@example.com", "secret-pass"))
        .await
        .unwrap();
    for currency in Currency::ALL {
        ledger
            .create_account(CreateAccountCmd::new("alice", currency))
            .await
            .unwrap();
    }
    ledger
        .create_account(CreateAccountCmd::new("bob", Currency::Usd))
        .await
        .unwrap();

    let all = ledger.list_accounts("alice", Page::default()).await.unwrap();
    assert_eq!(all.len(), Currency::ALL.len());
    assert!(all.iter().all(|a| a.owner == "alice"));
    assert!(all.windows(2).all(|w| w[0].id < w[1].id));

    let second = ledger
        .list_accounts("alice", Page::numbered(2, 2).unwrap())
        .await
        .unwrap();
    assert_eq!(second.len(), Currency::ALL.len() - 2);
    assert_eq!(second[0].id, all[2].id);

    let err = ledger
        .list_accounts("alice", Page::new(0, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidArgument(_)));
    let err = ledger
        .list_accounts("alice", Page::new(Page::MAX_LIMIT + 1, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidArgument(_)));
}

#[tokio::test]
async fn history_lookups() {
    let ledger = ledger_with_db().await;
    ledger
        .create_user(CreateUserCmd::new("bob", "Bob", "bob@example.com", "secret-pass"))
        .await
        .unwrap();
    let a = ledger
        .create_account(CreateAccountCmd::new("alice", Currency::Usd).balance(100))
        .await
        .unwrap();
    let b = ledger
        .create_account(CreateAccountCmd::new("bob", Currency::Usd))
        .await
        .unwrap();

    for amount in [10, 20, 30] {
        ledger
            .transfer(TransferCmd::new(a.id, b.id, amount))
            .await
            .unwrap();
    }

    let entries = ledger.list_entries(a.id, Page::default()).await.unwrap();
    let amounts: Vec<i64> = entries.iter().map(|e| e.amount).collect();
    assert_eq!(amounts, vec![-10, -20, -30]);

    let last = ledger.list_entries(b.id, Page::new(1, 2)).await.unwrap();
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].amount, 30);

    assert!(matches!(
        ledger.entry(9999).await.unwrap_err(),
        LedgerError::NotFound(_)
    ));
    assert!(matches!(
        ledger.transfer_record(9999).await.unwrap_err(),
        LedgerError::NotFound(_)
    ));

    let err = ledger
        .list_transfers(TransferListFilter::default(), Page::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidArgument(_)));

    let reaching_b = ledger
        .list_transfers(
            TransferListFilter {
                from_account_id: None,
                to_account_id: Some(b.id),
            },
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(reaching_b.len(), 3);
}

#[tokio::test]
async fn with_tx_rolls_back_on_error() {
    let ledger = ledger_with_db().await;
    let a = ledger
        .create_account(CreateAccountCmd::new("alice", Currency::Usd).balance(100))
        .await
        .unwrap();

    let id = a.id;
    let err = ledger
        .with_tx(move |_, tx| {
            Box::pin(async move {
                ledger::accessor::change_balance(tx, id, 50).await?;
                ledger::writer::create_entry(tx, id, 50).await?;
                Err::<(), _>(LedgerError::InvalidArgument("abort".to_string()))
            })
        })
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::InvalidArgument("abort".to_string()));

    assert_eq!(ledger.account(a.id).await.unwrap().balance, 100);
    assert!(ledger
        .list_entries(a.id, Page::default())
        .await
        .unwrap()
        .is_empty());

    let balance = ledger
        .with_tx(move |_, tx| {
            Box::pin(async move {
                let account = ledger::accessor::change_balance(tx, id, 25).await?;
                Ok::<_, LedgerError>(account.balance)
            })
        })
        .await
        .unwrap();
    assert_eq!(balance, 125);
    assert_eq!(ledger.account(a.id).await.unwrap().balance, 125);
}
