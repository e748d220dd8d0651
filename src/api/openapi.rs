//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::OpenApi;

use crate::api::handlers::auth_handler;
use crate::domain::UserResponse;

/// OpenAPI documentation for the signup/login API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Auth API",
        version = "0.1.0",
        description = "Signup and login backed by argon2-hashed credentials",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        auth_handler::sign_up,
        auth_handler::login,
    ),
    components(
        schemas(
            UserResponse,
            auth_handler::SignUpRequest,
            auth_handler::LoginRequest,
        )
    ),
    tags(
        (name = "Authentication", description = "User signup and login")
    )
)]
pub struct ApiDoc;
