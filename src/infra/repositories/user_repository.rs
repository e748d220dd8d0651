//! User repository - storage of user documents.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::config::ENTITY_USER;
use crate::domain::{NewUser, User};
use crate::errors::{AppError, AppResult};
use crate::infra::db;

#[cfg(test)]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Implementations must be safe to call concurrently without external locking.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user document and return it with its assigned id.
    ///
    /// A duplicate identifier yields `AppError::Conflict`; every other
    /// storage failure yields `AppError::Database`.
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    /// Find a user by login identifier. `Ok(None)` means not found.
    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<User>>;

    /// Check that storage is reachable.
    async fn ping(&self) -> AppResult<()>;
}

/// Concrete implementation of UserRepository backed by SeaORM
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance over a shared connection pool
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            identifier: Set(new_user.identifier),
            password_hash: Set(new_user.password_hash),
            created_at: Set(chrono::Utc::now()),
        };

        let model = active_model.insert(&self.db).await.map_err(map_insert_error)?;
        Ok(User::from(model))
    }

    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Identifier.eq(identifier))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn ping(&self) -> AppResult<()> {
        db::ping(&self.db).await.map_err(AppError::from)
    }
}

/// Unique-index violations mean another signup won the race.
fn map_insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::warn!(%detail, "Unique constraint rejected user insert");
            AppError::conflict(ENTITY_USER)
        }
        _ => AppError::from(err),
    }
}
