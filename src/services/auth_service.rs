//! Authentication service - signup and login use cases.
//!
//! Uniqueness, hashing and verification live here; request shape is checked
//! earlier by the handler's `ValidatedJson` extractor.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ENTITY_USER;
use crate::domain::{NewUser, Password, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UserRepository;

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user and return the stored record.
    async fn sign_up(&self, identifier: String, password: String) -> AppResult<User>;

    /// Check credentials. Unknown identifiers and wrong passwords fail identically.
    async fn login(&self, identifier: String, password: String) -> AppResult<User>;
}

/// Concrete implementation of AuthService over a user repository.
pub struct Authenticator {
    users: Arc<dyn UserRepository>,
}

impl Authenticator {
    /// Create new auth service instance
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn sign_up(&self, identifier: String, password: String) -> AppResult<User> {
        if self.users.find_by_identifier(&identifier).await?.is_some() {
            tracing::info!(%identifier, "Signup rejected: identifier already registered");
            return Err(AppError::conflict(ENTITY_USER));
        }

        let password_hash = hash_password(password).await?.into_string();

        // The insert can still lose a race with a concurrent signup; the
        // repository reports that as the same Conflict.
        let user = self
            .users
            .create(NewUser {
                identifier,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, identifier = %user.identifier, "User signed up");
        Ok(user)
    }

    async fn login(&self, identifier: String, password: String) -> AppResult<User> {
        let user = self.users.find_by_identifier(&identifier).await?;

        let stored = user
            .as_ref()
            .map(|user| Password::from_hash(user.password_hash.clone()));
        let password_valid = verify_password(stored, password).await?;

        match user {
            Some(user) if password_valid => {
                tracing::info!(user_id = %user.id, "User logged in");
                Ok(user)
            }
            _ => {
                tracing::info!(%identifier, "Login rejected");
                Err(AppError::InvalidCredentials)
            }
        }
    }
}

/// Hash on the blocking pool; argon2 is deliberately CPU-heavy.
async fn hash_password(plain_text: String) -> AppResult<Password> {
    tokio::task::spawn_blocking(move || Password::new(&plain_text))
        .await
        .map_err(|e| AppError::internal(format!("Password hashing task failed: {}", e)))?
}

/// Verify on the blocking pool. Without a stored hash the dummy hash is
/// checked instead and the result is always `false`.
async fn verify_password(stored: Option<Password>, plain_text: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || match stored {
        Some(stored) => stored.verify(&plain_text),
        None => {
            if let Some(dummy) = Password::dummy() {
                dummy.verify(&plain_text);
            }
            false
        }
    })
    .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mockall::predicate::eq;
    use uuid::Uuid;

    use crate::infra::MockUserRepository;

    fn stored_user(identifier: &str, plain: &str) -> User {
        User {
            id: Uuid::new_v4(),
            identifier: identifier.to_string(),
            password_hash: Password::new(plain).unwrap().into_string(),
            created_at: Utc::now(),
        }
    }

    fn service(repo: MockUserRepository) -> Authenticator {
        Authenticator::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn test_sign_up_persists_hash_not_plain_text() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_identifier()
            .with(eq("a@b.com"))
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_create()
            .withf(|new_user| {
                new_user.identifier == "a@b.com"
                    && new_user.password_hash != "Secret123"
                    && !new_user.password_hash.contains("Secret123")
                    && Password::from_hash(new_user.password_hash.clone()).verify("Secret123")
            })
            .times(1)
            .returning(|new_user| {
                Ok(User {
                    id: Uuid::new_v4(),
                    identifier: new_user.identifier,
                    password_hash: new_user.password_hash,
                    created_at: Utc::now(),
                })
            });

        let user = service(repo)
            .sign_up("a@b.com".to_string(), "Secret123".to_string())
            .await
            .unwrap();

        assert_eq!(user.identifier, "a@b.com");
    }

    #[tokio::test]
    async fn test_sign_up_existing_identifier_conflicts() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_identifier()
            .returning(|id| Ok(Some(stored_user(id, "Secret123"))));
        repo.expect_create().never();

        let result = service(repo)
            .sign_up("a@b.com".to_string(), "Secret123".to_string())
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_sign_up_lost_race_conflicts() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_identifier().returning(|_| Ok(None));
        repo.expect_create()
            .returning(|_| Err(AppError::conflict(ENTITY_USER)));

        let result = service(repo)
            .sign_up("a@b.com".to_string(), "Secret123".to_string())
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_sign_up_storage_failure_propagates() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_identifier()
            .returning(|_| Err(AppError::Database(sea_orm::DbErr::Custom("down".into()))));
        repo.expect_create().never();

        let result = service(repo)
            .sign_up("a@b.com".to_string(), "Secret123".to_string())
            .await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_identifier()
            .with(eq("a@b.com"))
            .returning(|id| Ok(Some(stored_user(id, "Secret123"))));

        let user = service(repo)
            .login("a@b.com".to_string(), "Secret123".to_string())
            .await
            .unwrap();

        assert_eq!(user.identifier, "a@b.com");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let mut wrong_password_repo = MockUserRepository::new();
        wrong_password_repo
            .expect_find_by_identifier()
            .returning(|id| Ok(Some(stored_user(id, "Secret123"))));

        let mut unknown_user_repo = MockUserRepository::new();
        unknown_user_repo
            .expect_find_by_identifier()
            .returning(|_| Ok(None));

        let wrong_password = service(wrong_password_repo)
            .login("a@b.com".to_string(), "wrong".to_string())
            .await
            .unwrap_err();
        let unknown_user = service(unknown_user_repo)
            .login("nouser@b.com".to_string(), "Secret123".to_string())
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_user, AppError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert_eq!(wrong_password.code(), unknown_user.code());
    }

    #[tokio::test]
    async fn test_verify_without_stored_hash_never_succeeds() {
        let valid = verify_password(None, "dummy-password-never-matches-0".to_string())
            .await
            .unwrap();
        assert!(!valid);

        let stored = Password::new("Secret123").unwrap();
        assert!(verify_password(Some(stored), "Secret123".to_string())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_login_unknown_user_with_dummy_plain_text_is_rejected() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_identifier().returning(|_| Ok(None));

        let result = service(repo)
            .login(
                "nouser@b.com".to_string(),
                "dummy-password-never-matches-0".to_string(),
            )
            .await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }
}
