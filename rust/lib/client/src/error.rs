use epaket_core::AppError;

/// Client-side error for calls against the hosted service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("auth: {0}")]
    Auth(String),

    #[error("decode: {0}")]
    Decode(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Server { status, message } => AppError::from_status(status, message),
            ApiError::Network(e) => AppError::Remote(format!("network: {}", e)),
            ApiError::Auth(msg) => AppError::Unauthorized(msg),
            ApiError::Decode(msg) => AppError::Remote(format!("decode: {}", msg)),
            ApiError::NotFound(msg) => AppError::NotFound(msg),
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// The data API answers `{"message": ...}`, the auth API uses `msg`,
/// `error_description` or `error`. Anything else is returned verbatim.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_extraction() {
        assert_eq!(error_message(r#"{"message":"duplicate key","code":"23505"}"#), "duplicate key");
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn maps_into_app_error() {
        let err: AppError = ApiError::Server { status: 409, message: "dup".into() }.into();
        assert_eq!(err, AppError::Conflict("dup".into()));
        let err: AppError = ApiError::Auth("expired".into()).into();
        assert_eq!(err, AppError::Unauthorized("expired".into()));
        let err: AppError = ApiError::NotFound("pakages/1".into()).into();
        assert_eq!(err, AppError::NotFound("pakages/1".into()));
    }
}
