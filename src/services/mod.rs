//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on the repository trait, never on
//! a concrete storage engine.

mod auth_service;

pub use auth_service::{AuthService, Authenticator};
