//! 에러 타입 및 Axum 응답 변환

use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Room not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Meeting rooms are disabled")]
    Disabled,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) | AppError::Disabled => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::Forbidden(_) => "forbidden",
            AppError::Upstream(_) => "upstream_error",
            AppError::Validation(_) => "validation_error",
            AppError::Unauthorized => "unauthorized",
            AppError::Disabled => "disabled",
            AppError::Storage(_) => "storage_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 저장소 내부 정보는 응답에 노출하지 않음
        let message = match &self {
            AppError::Storage(err) => {
                tracing::error!(error = %err, "Storage failure while handling request");
                "Internal storage error".to_string()
            }
            other => other.to_string(),
        };

        let body = serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}
