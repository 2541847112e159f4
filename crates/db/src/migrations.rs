use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Versions touched by one `apply` call, split by whether this call ran them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub applied_now: Vec<i64>,
    pub already_applied: Vec<i64>,
}

/// Safe to call on every launch; applied migrations are skipped.
pub async fn apply(pool: &DbPool) -> Result<MigrationReport, MigrateError> {
    let before = applied_versions(pool).await?;
    MIGRATOR.run(pool).await?;

    let (already_applied, applied_now): (Vec<i64>, Vec<i64>) =
        MIGRATOR.iter().map(|migration| migration.version).partition(|v| before.contains(v));
    Ok(MigrationReport { applied_now, already_applied })
}

async fn applied_versions(pool: &DbPool) -> Result<Vec<i64>, sqlx::Error> {
    let ledger: Option<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_optional(pool)
    .await?;
    if ledger.is_none() {
        return Ok(Vec::new());
    }

    sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success = 1 ORDER BY version")
        .fetch_all(pool)
        .await
}
