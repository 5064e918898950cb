//! SQLite schema helpers.

use sqlx::SqlitePool;
use tracing::debug;

/// Execute every `;`-separated statement of a migration script in order.
pub async fn apply_migration_sql(db: &SqlitePool, sql: &str) -> Result<usize, sqlx::Error> {
    let statements = sql
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    for stmt in &statements {
        debug!("Executing migration SQL: {}", stmt);
        sqlx::query(stmt).execute(db).await?;
    }

    Ok(statements.len())
}
