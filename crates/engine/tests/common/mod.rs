use chrono::{NaiveDate, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::Engine;
use migration::MigratorTrait;

/// Fresh in-memory database with the schema applied, one user ("alice") and
/// the default catalog seeded.
pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build().unwrap();
    engine
        .ensure_user("alice", "Alice", None, Utc::now())
        .await
        .unwrap();
    engine.seed_default_catalog(Utc::now()).await.unwrap();
    (engine, db)
}

#[allow(dead_code)]
pub async fn add_user(engine: &Engine, username: &str, name: &str) {
    engine
        .ensure_user(username, name, None, Utc::now())
        .await
        .unwrap();
}

#[allow(dead_code)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
