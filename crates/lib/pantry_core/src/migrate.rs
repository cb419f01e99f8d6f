//! Database migration support.
//!
//! Embeds and runs SQL migrations from `pantry_core/migrations/`.

use sqlx::PgPool;
use tracing::info;

/// Run all embedded database migrations against the given pool.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    let migrator = sqlx::migrate!("./migrations");
    migrator.run(pool).await?;
    info!(count = migrator.iter().count(), "migrations applied");
    Ok(())
}
