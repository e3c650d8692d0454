use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::template::TemplateError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// HTTP status and stable error code for the response body.
    ///
    /// Load-phase template errors should never reach a handler (the load
    /// happens before the server starts); they map to 500.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            AppError::Template(err) => match err {
                TemplateError::UnknownTrigger { .. } => (StatusCode::NOT_FOUND, "UNKNOWN_TRIGGER"),
                TemplateError::WebsocketUnsupported
                | TemplateError::UnsupportedTransport { .. } => {
                    (StatusCode::BAD_REQUEST, "INVALID_TRANSPORT")
                }
                TemplateError::InvalidVersion { .. } => (StatusCode::BAD_REQUEST, "INVALID_VERSION"),
                TemplateError::UnknownType { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "UNKNOWN_TYPE")
                }
                TemplateError::RefTypeMismatch { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "REF_TYPE_MISMATCH")
                }
                TemplateError::UnknownRef { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "UNKNOWN_REF")
                }
                TemplateError::MissingData { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "MISSING_DATA")
                }
                TemplateError::DataConversion { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "DATA_CONVERSION")
                }
                TemplateError::NestedReference { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "NESTED_REFERENCE")
                }
                TemplateError::Io { .. }
                | TemplateError::Parse { .. }
                | TemplateError::MissingTransports { .. }
                | TemplateError::MissingIdentity { .. }
                | TemplateError::DuplicateEvent { .. }
                | TemplateError::DuplicateReference { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "TEMPLATE_LOAD_ERROR")
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.to_string();

        // Always log the detailed error server-side
        tracing::error!(
            code = %code,
            status = %status.as_u16(),
            message = %message,
            "API error"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_errors_map_to_client_codes() {
        let err = AppError::Template(TemplateError::UnknownTrigger {
            trigger: "x.y".to_string(),
        });
        assert_eq!(err.status_and_code(), (StatusCode::NOT_FOUND, "UNKNOWN_TRIGGER"));

        let err = AppError::Template(TemplateError::WebsocketUnsupported);
        assert_eq!(
            err.status_and_code(),
            (StatusCode::BAD_REQUEST, "INVALID_TRANSPORT")
        );
    }

    #[test]
    fn test_resolve_errors_map_to_unprocessable() {
        let err = AppError::Template(TemplateError::UnknownRef {
            name: "bogus".to_string(),
            identifier: "id".to_string(),
        });
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "UNKNOWN_REF");
    }
}
