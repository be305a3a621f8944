use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::cache::CacheError;
use crate::database::StoreError;
use crate::utils::{error_codes, error_to_api_response};

/// 应用错误分类，边界层据此映射 HTTP 状态码
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("dependency unavailable: {0}")]
    Dependency(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Dependency(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> i32 {
        match self {
            AppError::Validation(_) => error_codes::VALIDATION_ERROR,
            AppError::Unauthorized => error_codes::AUTH_FAILED,
            AppError::NotFound(_) => error_codes::NOT_FOUND,
            AppError::Conflict(_) => error_codes::CONFLICT,
            AppError::Dependency(_) => error_codes::DEPENDENCY_ERROR,
            AppError::Internal(_) => error_codes::INTERNAL_ERROR,
        }
    }

    /// Message safe to hand to the client. Internal causes stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::Conflict(msg) => msg.clone(),
            AppError::Unauthorized => "invalid or missing credentials".to_string(),
            AppError::NotFound(what) => format!("{} not found", what),
            AppError::Dependency(_) => "service temporarily unavailable".to_string(),
            AppError::Internal(_) => "internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Dependency(cause) => tracing::error!("Dependency failure: {}", cause),
            AppError::Internal(cause) => tracing::error!("Internal failure: {}", cause),
            _ => {}
        }

        let status = self.status();
        (
            status,
            error_to_api_response::<()>(self.code(), self.public_message()),
        )
            .into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(key) => AppError::Conflict(format!("{} already exists", key)),
            other => AppError::Dependency(other.to_string()),
        }
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        AppError::Dependency(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("password hashing failed: {}", err))
    }
}
