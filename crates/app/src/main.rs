use clap::{Args, Parser, Subcommand};
use ledger::{
    CreateAccountCmd, CreateUserCmd, Currency, Ledger, Page, TransferCmd, TransferListFilter,
};
use migration::{Migrator, MigratorTrait};
use sea_orm::ConnectOptions;
use serde::Serialize;

use error::{AppError, Result};
use settings::{Database, Settings};

mod error;
mod handlers;
mod settings;

#[derive(Parser, Debug)]
#[command(name = "bank")]
#[command(about = "Banking ledger: accounts, atomic transfers and their audit trail")]
struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, env = "BANK_CONFIG")]
    config: Option<String>,
    /// Override the database connection string.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    /// Override the log level.
    #[arg(long)]
    level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations and exit.
    Migrate,
    User(User),
    Account(Account),
    /// Move funds between two accounts.
    Transfer(TransferArgs),
    /// List the ledger entries of an account.
    Entries(HistoryArgs),
    /// List the transfers touching an account.
    Transfers(HistoryArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    Show {
        #[arg(long)]
        username: String,
    },
    /// Replace a user's password.
    Passwd {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Exit with status 0 when the password matches, 1 otherwise.
    CheckPassword {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Create(AccountCreateArgs),
    Show {
        #[arg(long)]
        id: i64,
    },
    List {
        #[arg(long)]
        owner: String,
        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Args, Debug)]
struct AccountCreateArgs {
    #[arg(long)]
    owner: String,
    #[arg(long, value_parser = parse_currency)]
    currency: Currency,
    /// Opening balance in minor units.
    #[arg(long, default_value_t = 0)]
    balance: i64,
}

#[derive(Args, Debug)]
struct TransferArgs {
    #[arg(long)]
    from: i64,
    #[arg(long)]
    to: i64,
    /// Amount in minor units.
    #[arg(long)]
    amount: i64,
    #[arg(long, value_parser = parse_currency)]
    currency: Currency,
    /// Acting user; when set it must own the `from` account.
    #[arg(long = "as")]
    acting_user: Option<String>,
}

#[derive(Args, Debug)]
struct HistoryArgs {
    #[arg(long)]
    account: i64,
    #[command(flatten)]
    page: PageArgs,
}

#[derive(Args, Debug)]
struct PageArgs {
    #[arg(long, default_value_t = 1)]
    page_id: u64,
    #[arg(long, default_value_t = 10)]
    page_size: u64,
}

impl PageArgs {
    fn page(&self) -> Result<Page> {
        Ok(Page::numbered(self.page_id, self.page_size)?)
    }
}

fn parse_currency(raw: &str) -> std::result::Result<Currency, String> {
    Currency::try_from(raw).map_err(|err| err.to_string())
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(url) = cli.database_url.clone() {
        settings.database = Database::Url(url);
    }
    if let Some(level) = cli.level.clone() {
        settings.app.level = level;
    }

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "bank={level},ledger={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let ledger = open_ledger(&settings).await?;
    let outcome = run(&ledger, cli.command).await;
    ledger.close().await?;
    outcome?;
    Ok(())
}

async fn open_ledger(settings: &Settings) -> Result<Ledger> {
    let mut options = ConnectOptions::new(settings.database.url());
    options.sqlx_logging(false);
    if let Some(max) = settings.database_max_connections {
        options.max_connections(max);
    }
    let database = sea_orm::Database::connect(options).await?;
    Migrator::up(&database, None).await?;

    let ledger = Ledger::builder()
        .database(database)
        .transfer_timeout(settings.ledger.transfer_timeout())
        .explicit_row_locks(settings.ledger.explicit_row_locks)
        .build()
        .await?;
    Ok(ledger)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(ledger: &Ledger, command: Command) -> Result<()> {
    match command {
        Command::Migrate => {
            tracing::info!("migrations applied");
            Ok(())
        }
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let user = ledger
                .create_user(CreateUserCmd::new(
                    args.username,
                    args.full_name,
                    args.email,
                    args.password,
                ))
                .await?;
            print_json(&user)
        }
        Command::User(User {
            command: UserCommand::Show { username },
        }) => print_json(&ledger.user(&username).await?),
        Command::User(User {
            command: UserCommand::Passwd { username, password },
        }) => print_json(&ledger.change_password(&username, &password).await?),
        Command::User(User {
            command: UserCommand::CheckPassword { username, password },
        }) => {
            if ledger.check_password(&username, &password).await? {
                Ok(())
            } else {
                Err(AppError::Unauthorized(format!(
                    "incorrect password for {username}"
                )))
            }
        }
        Command::Account(Account {
            command: AccountCommand::Create(args),
        }) => {
            let account = ledger
                .create_account(CreateAccountCmd::new(args.owner, args.currency).balance(args.balance))
                .await?;
            print_json(&account)
        }
        Command::Account(Account {
            command: AccountCommand::Show { id },
        }) => print_json(&ledger.account(id).await?),
        Command::Account(Account {
            command: AccountCommand::List { owner, page },
        }) => print_json(&ledger.list_accounts(&owner, page.page()?).await?),
        Command::Transfer(args) => {
            let result = handlers::create_transfer(
                ledger,
                TransferCmd::new(args.from, args.to, args.amount),
                args.currency,
                args.acting_user.as_deref(),
            )
            .await?;
            print_json(&result)
        }
        Command::Entries(args) => {
            print_json(&ledger.list_entries(args.account, args.page.page()?).await?)
        }
        Command::Transfers(args) => print_json(
            &ledger
                .list_transfers(TransferListFilter::touching(args.account), args.page.page()?)
                .await?,
        ),
    }
}
