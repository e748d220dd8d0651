//! User Auth API - signup and login over HTTP.
//!
//! A thin three-layer slice: handlers validate the request, the
//! authentication service applies uniqueness and password rules, and the
//! user repository stores documents in a single `users` collection.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations (`serve`, `migrate`)
//! - **config**: Application configuration and constants
//! - **domain**: User entity and password value object
//! - **services**: Signup and login use cases
//! - **infra**: Database connection, migrations and the user repository
//! - **api**: HTTP handlers, validation extractor and routes
//! - **types**: Shared response wrappers
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User};
pub use errors::{AppError, AppResult};
