use std::error::Error;

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use engine::{Engine, EntryKind, RecordTransactionCmd};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "hucha_admin")]
#[command(about = "Admin utilities for Hucha (bootstrap users, seed defaults, settle splits)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./hucha.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    /// Seed the global default categories and payment methods.
    Seed,
    Tx(Tx),
    Split(Split),
    /// List a user's pending shares and their total.
    Pending(PendingArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: Option<String>,
}

#[derive(Args, Debug)]
struct Tx {
    #[command(subcommand)]
    command: TxCommand,
}

#[derive(Subcommand, Debug)]
enum TxCommand {
    Add(TxAddArgs),
}

#[derive(Args, Debug)]
struct TxAddArgs {
    #[arg(long)]
    owner: String,
    #[arg(long)]
    category: String,
    /// Total amount; split evenly when --installments > 1.
    #[arg(long)]
    amount: f64,
    #[arg(long, value_parser = parse_kind, default_value = "expense")]
    kind: EntryKind,
    /// First instalment date (YYYY-MM-DD).
    #[arg(long)]
    date: NaiveDate,
    #[arg(long, default_value_t = 1)]
    installments: u32,
    #[arg(long)]
    payment_method: Option<String>,
    #[arg(long)]
    details: Option<String>,
}

#[derive(Args, Debug)]
struct Split {
    #[command(subcommand)]
    command: SplitCommand,
}

#[derive(Subcommand, Debug)]
enum SplitCommand {
    Settle(SplitSettleArgs),
}

#[derive(Args, Debug)]
struct SplitSettleArgs {
    #[arg(long)]
    id: i32,
}

#[derive(Args, Debug)]
struct PendingArgs {
    #[arg(long)]
    username: String,
}

fn parse_kind(raw: &str) -> Result<EntryKind, String> {
    EntryKind::try_from(raw).map_err(|err| err.to_string())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hucha_admin=info,engine=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build()?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let created = engine
                .ensure_user(&args.username, &args.name, args.email.as_deref(), Utc::now())
                .await?;
            if created {
                println!("created user: {}", args.username);
            } else {
                println!("user already exists: {}", args.username);
            }
        }
        Command::Seed => {
            engine.seed_default_catalog(Utc::now()).await?;
            println!("seeded default categories and payment methods");
        }
        Command::Tx(Tx {
            command: TxCommand::Add(args),
        }) => {
            let mut cmd = RecordTransactionCmd::new(
                &args.owner,
                &args.category,
                args.kind,
                args.amount,
                args.date,
                Utc::now(),
            )
            .installments(args.installments);
            if let Some(method) = args.payment_method {
                cmd = cmd.payment_method(method);
            }
            if let Some(details) = args.details {
                cmd = cmd.details(details);
            }
            let purchase_id = engine.record_transaction(cmd).await?;
            println!("recorded purchase: {purchase_id}");
        }
        Command::Split(Split {
            command: SplitCommand::Settle(args),
        }) => {
            engine.settle_split(args.id, Utc::now()).await?;
            println!("settled split: {}", args.id);
        }
        Command::Pending(args) => {
            let pending = engine.pending_splits_for(&args.username).await?;
            for split in &pending {
                println!(
                    "#{}  {:>10.2}  {}  {} ({})",
                    split.id,
                    split.amount,
                    split.date,
                    split.category,
                    split.payer_name,
                );
            }
            let balance = engine.pending_balance(&args.username).await?;
            println!("total pending: {balance:.2}");
        }
    }

    Ok(())
}
