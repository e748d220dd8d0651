//! API layer - HTTP handlers and routing
//!
//! - Request handlers
//! - Custom extractors (validation)
//! - Route definitions
//! - OpenAPI documentation

pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
