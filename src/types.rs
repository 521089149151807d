// Shared error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A date field was present in an upstream record but did not match the
    /// upstream timestamp format.
    #[error("Malformed record: field `{field}` has unparsable value {value:?}")]
    MalformedRecord { field: String, value: String },

    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport, HTTP status or envelope decode failure talking to upstream.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MalformedRecord { .. } | AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));
        (status, body).into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("solnbr ABC".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Upstream("connection refused".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::MalformedRecord {
                field: "close_dt".to_string(),
                value: "yesterday".to_string(),
            }
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_malformed_record_message() {
        let err = AppError::MalformedRecord {
            field: "open_dt".to_string(),
            value: "2013-04-05".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("open_dt"));
        assert!(message.contains("2013-04-05"));
    }
}
