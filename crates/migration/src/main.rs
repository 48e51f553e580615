use sea_orm::Database;
use sea_orm_migration::prelude::*;

const USAGE: &str = "Usage: cargo run -p migration -- [up|down|fresh|status]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cmd = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());

    let db_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:./hucha.db?mode=rwc".to_string());
    let db = Database::connect(&db_url).await?;

    match cmd.as_str() {
        "up" => migration::Migrator::up(&db, None).await?,
        "down" => migration::Migrator::down(&db, None).await?,
        "fresh" => migration::Migrator::fresh(&db).await?,
        "status" => migration::Migrator::status(&db).await?,
        other => {
            eprintln!("unknown command: {other}");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }

    Ok(())
}
