//! Application state - Dependency injection container.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::infra::{UserRepository, UserStore};
use crate::services::{AuthService, Authenticator};

/// Application state shared by all handlers.
///
/// Cloning is cheap; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Signup and login use cases
    pub auth_service: Arc<dyn AuthService>,
    /// User storage, also probed by the health endpoint
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    /// Wire the production object graph over a shared connection pool.
    pub fn from_connection(connection: DatabaseConnection) -> Self {
        let users: Arc<dyn UserRepository> = Arc::new(UserStore::new(connection));
        Self::from_repository(users)
    }

    /// Wire the service layer over any repository implementation.
    pub fn from_repository(users: Arc<dyn UserRepository>) -> Self {
        Self {
            auth_service: Arc::new(Authenticator::new(users.clone())),
            users,
        }
    }
}
