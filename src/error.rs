use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthError>;

/// Error taxonomy for the session and access-control core.
///
/// Every failure path maps to a machine-distinguishable kind plus an HTTP
/// status class. Authentication failures are never downgraded to a generic
/// success, and store/notifier outages are kept distinct from credential
/// failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("This account has been suspended")]
    AccountSuspended,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("You are not allowed to perform this action")]
    Forbidden,

    #[error("Policy violation: {0}")]
    PolicyViolation(String),

    #[error("New password must be different from the current one")]
    SecretUnchanged,

    #[error("User not found")]
    PrincipalNotFound,

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AuthError {
    fn kind(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::AccountSuspended => "ACCOUNT_SUSPENDED",
            AuthError::Unauthenticated => "UNAUTHENTICATED",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::SessionExpired => "SESSION_EXPIRED",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::PolicyViolation(_) => "POLICY_VIOLATION",
            AuthError::SecretUnchanged => "SECRET_UNCHANGED",
            AuthError::PrincipalNotFound => "PRINCIPAL_NOT_FOUND",
            AuthError::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::DependencyUnavailable(_) => "DEPENDENCY_UNAVAILABLE",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AuthError::AccountSuspended => StatusCode::FORBIDDEN,
            AuthError::Unauthenticated
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::PolicyViolation(_)
            | AuthError::SecretUnchanged
            | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::PrincipalNotFound => StatusCode::NOT_FOUND,
            AuthError::EmailAlreadyExists => StatusCode::CONFLICT,
            AuthError::DependencyUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Internal detail stays in the logs, not in client responses
        let message = match self {
            AuthError::DependencyUnavailable(_) => "Service temporarily unavailable".to_string(),
            AuthError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.kind().to_string(),
            message,
        })
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = %err, "credential store error");
        AuthError::DependencyUnavailable(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AuthError::Validation(errors.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for AuthError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        tracing::error!(error = %err, "smtp transport error");
        AuthError::DependencyUnavailable(err.to_string())
    }
}
