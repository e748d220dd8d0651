//! Migrate command - schema management for the users collection.

use sea_orm::DbErr;

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| migration_failed("connect", e))?;

    match args.action {
        MigrateAction::Up => {
            tracing::info!("Running pending migrations...");
            db.run_migrations()
                .await
                .map_err(|e| migration_failed("up", e))?;
            tracing::info!("Migrations completed successfully");
        }
        MigrateAction::Down => {
            tracing::info!("Rolling back last migration...");
            db.rollback_migration()
                .await
                .map_err(|e| migration_failed("down", e))?;
            tracing::info!("Rollback completed successfully");
        }
        MigrateAction::Status => {
            let status = db
                .migration_status()
                .await
                .map_err(|e| migration_failed("status", e))?;
            for (name, applied) in status {
                let state = if applied { "applied" } else { "pending" };
                println!("{}: {}", name, state);
            }
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping the users collection and re-running all migrations...");
            db.fresh_migrations()
                .await
                .map_err(|e| migration_failed("fresh", e))?;
            tracing::info!("Fresh migrations completed successfully");
        }
    }

    Ok(())
}

/// CLI failures keep the driver message; there is no client to hide it from.
fn migration_failed(step: &str, err: DbErr) -> AppError {
    AppError::internal(format!("migrate {}: {}", step, err))
}
