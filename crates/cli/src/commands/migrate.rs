//! Database migration command.
//!
//! Migrations live in `crates/api/migrations/` and are embedded into the API
//! crate, so the CLI and the server always agree on the schema version.

use routeclouds_api::db::MIGRATOR;

use super::{CommandError, connect};

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails, or
/// a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
