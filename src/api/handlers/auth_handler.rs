//! Authentication handlers.

use axum::{extract::State, response::Json, routing::post, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::config::LOGIN_SUCCESS_MESSAGE;
use crate::domain::password::validate_password_strength;
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created};

/// Signup request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignUpRequest {
    /// Login identifier (email address)
    #[validate(
        length(min = 1, max = 254, message = "Identifier is required and must be at most 254 characters"),
        email(message = "Invalid email format")
    )]
    #[schema(example = "a@b.com")]
    pub identifier: String,
    /// Password (8-128 characters, at least one letter and one digit)
    #[validate(
        length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"),
        custom(function = "validate_password_strength")
    )]
    #[schema(example = "Secret123", min_length = 8, max_length = 128)]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Login identifier (email address)
    #[validate(
        length(min = 1, message = "Identifier is required"),
        email(message = "Invalid email format")
    )]
    #[schema(example = "a@b.com")]
    pub identifier: String,
    /// Password (at most 128 characters)
    #[validate(length(
        min = 1,
        max = 128,
        message = "Password is required and must be at most 128 characters"
    ))]
    #[schema(example = "Secret123", max_length = 128)]
    pub password: String,
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/login", post(login))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/signup",
    tag = "Authentication",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Identifier already registered"),
        (status = 500, description = "Storage error")
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SignUpRequest>,
) -> AppResult<Created<UserResponse>> {
    let user = state
        .auth_service
        .sign_up(payload.identifier, payload.password)
        .await?;

    Ok(Created(UserResponse::from(user)))
}

/// Check credentials
#[utoipa::path(
    post,
    path = "/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Storage error")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = state
        .auth_service
        .login(payload.identifier, payload.password)
        .await?;

    Ok(Json(ApiResponse::with_message(
        UserResponse::from(user),
        LOGIN_SUCCESS_MESSAGE,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    fn sign_up_request(identifier: &str, password: &str) -> SignUpRequest {
        SignUpRequest {
            identifier: identifier.to_string(),
            password: password.to_string(),
        }
    }

    fn rejected_fields(result: Result<(), validator::ValidationErrors>) -> Vec<(String, String)> {
        match AppError::from(result.unwrap_err()) {
            AppError::Validation { fields, .. } => {
                fields.into_iter().map(|f| (f.field, f.rule)).collect()
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_sign_up() {
        assert!(sign_up_request("a@b.com", "Secret123").validate().is_ok());
    }

    #[test]
    fn test_sign_up_rejects_empty_fields() {
        let fields = rejected_fields(sign_up_request("", "").validate());

        assert!(fields.iter().any(|(f, _)| f == "identifier"));
        assert!(fields.iter().any(|(f, _)| f == "password"));
    }

    #[test]
    fn test_sign_up_rejects_bad_email() {
        let fields = rejected_fields(sign_up_request("not-an-email", "Secret123").validate());
        assert_eq!(fields, vec![("identifier".to_string(), "email".to_string())]);
    }

    #[test]
    fn test_sign_up_rejects_short_password() {
        let fields = rejected_fields(sign_up_request("a@b.com", "Ab1").validate());
        assert_eq!(fields, vec![("password".to_string(), "length".to_string())]);
    }

    #[test]
    fn test_sign_up_rejects_weak_password() {
        let fields = rejected_fields(sign_up_request("a@b.com", "abcdefghij").validate());
        assert_eq!(
            fields,
            vec![("password".to_string(), "password_strength".to_string())]
        );
    }

    #[test]
    fn test_login_accepts_short_password() {
        let request = LoginRequest {
            identifier: "a@b.com".to_string(),
            password: "wrong".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_login_rejects_empty_password() {
        let request = LoginRequest {
            identifier: "a@b.com".to_string(),
            password: String::new(),
        };
        let fields = rejected_fields(request.validate());
        assert_eq!(fields, vec![("password".to_string(), "length".to_string())]);
    }

    #[test]
    fn test_login_rejects_oversized_password() {
        let request = LoginRequest {
            identifier: "a@b.com".to_string(),
            password: "a1".repeat(64) + "x",
        };
        let fields = rejected_fields(request.validate());
        assert_eq!(fields, vec![("password".to_string(), "length".to_string())]);

        let at_limit = LoginRequest {
            identifier: "a@b.com".to_string(),
            password: "a1".repeat(64),
        };
        assert!(at_limit.validate().is_ok());
    }
}
