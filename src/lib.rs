/// Campus Auth Service Library
///
/// Session and access-control core for the campus academic-records backend.
/// Handles dual-token authentication with refresh rotation, role-based
/// authorization gating, and per-field redaction of sensitive resource
/// content. Resource CRUD, AI generation and email content pipelines live in
/// adjacent services and reach this core through narrow trait interfaces.
///
/// ## Modules
///
/// - `config`: Service configuration
/// - `error`: Error types and HTTP mapping
/// - `models`: User records, roles, principals, request DTOs
/// - `security`: Password hashing (Argon2id) and the token codec
/// - `store`: Credential store trait plus Postgres and in-memory backends
/// - `services`: Business logic (authenticator, notifier)
/// - `middleware`: Authorization gate
/// - `policy`: Role-driven field redaction and ownership scoping
/// - `http`: Handlers, routes, and the session cookie transport
pub mod app_state;
pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod security;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use app_state::AppState;
pub use error::{AuthError, Result};
pub use models::{Principal, UserRole};
