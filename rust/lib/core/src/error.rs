use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Front ends match on these,
// never on the human-readable message string.

/// Stable error code constants.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const REMOTE_ERROR: &str = "REMOTE_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

// ── AppError ────────────────────────────────────────────────────────

/// Unified error type used by every module and view.
///
/// Nothing here is fatal: a view that receives an `AppError` surfaces it
/// as a notice and stays in its pre-action state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Record does not exist remotely.
    #[error("{0}")]
    NotFound(String),

    /// Write rejected by a uniqueness or foreign-key constraint.
    #[error("{0}")]
    Conflict(String),

    /// Input data is invalid.
    #[error("{0}")]
    Validation(String),

    /// Missing, expired or rejected credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but the remote row-level policy refused the call.
    #[error("{0}")]
    PermissionDenied(String),

    /// The remote call failed (network, server error, undecodable body).
    #[error("{0}")]
    Remote(String),

    /// Unexpected internal error.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => error_code::NOT_FOUND,
            AppError::Conflict(_) => error_code::ALREADY_EXISTS,
            AppError::Validation(_) => error_code::VALIDATION_FAILED,
            AppError::Unauthorized(_) => error_code::UNAUTHENTICATED,
            AppError::PermissionDenied(_) => error_code::PERMISSION_DENIED,
            AppError::Remote(_) => error_code::REMOTE_ERROR,
            AppError::Internal(_) => error_code::INTERNAL,
        }
    }

    /// Map an HTTP status and message from the remote service.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 | 422 => AppError::Validation(message),
            401 => AppError::Unauthorized(message),
            403 => AppError::PermissionDenied(message),
            404 | 406 => AppError::NotFound(message),
            409 => AppError::Conflict(message),
            _ => AppError::Remote(message),
        }
    }
}
