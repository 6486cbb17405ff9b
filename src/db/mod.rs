//! Document store backed by SQLite.
//!
//! Each collection is a table of JSON documents keyed by a generated id.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::models::{
    About, Admin, Contact, Entity, Message, Project, PushSubscription, Skill, WorkExperience, Year,
};

/// Open the document store and create any missing collections.
pub async fn init_database(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    // Ensure the parent directory exists
    if let Some(parent) = options.get_filename().parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Create every collection table and its indexes.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    create_collection::<About>(pool).await?;
    create_collection::<Admin>(pool).await?;
    create_collection::<Contact>(pool).await?;
    create_collection::<Message>(pool).await?;
    create_collection::<Project>(pool).await?;
    create_collection::<PushSubscription>(pool).await?;
    create_collection::<Skill>(pool).await?;
    create_collection::<WorkExperience>(pool).await?;
    create_collection::<Year>(pool).await?;
    Ok(())
}

async fn create_collection<T: Entity>(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let table = T::COLLECTION;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id TEXT PRIMARY KEY,
            doc TEXT NOT NULL,
            sort_order INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_{table}_sort_order ON {table}(sort_order);
        "#
    ))
    .execute(pool)
    .await?;

    for field in T::UNIQUE {
        sqlx::query(&format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_{table}_{field} ON {table}(json_extract(doc, '$.{field}'));"
        ))
        .execute(pool)
        .await?;
    }

    Ok(())
}
