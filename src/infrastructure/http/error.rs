//! HTTP Error Handling
//!
//! 错误统一返回 `{errno, error, data}`，HTTP 状态码与 errno 一致

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const NOT_FOUND: i32 = 404;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const BAD_GATEWAY: i32 = 502;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    /// 合成 / 识别服务失败
    BadGateway(String),
    Internal(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, i32, &str) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, errno::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, errno::NOT_FOUND, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, errno::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                errno::INTERNAL_ERROR,
                msg,
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, msg) = self.parts();
        match &self {
            ApiError::BadRequest(_) => {
                tracing::warn!(errno = code, error = %msg, "Bad request")
            }
            ApiError::NotFound(_) => {
                tracing::warn!(errno = code, error = %msg, "Resource not found")
            }
            ApiError::BadGateway(_) => {
                tracing::error!(errno = code, error = %msg, "Upstream service failed")
            }
            ApiError::Internal(_) => {
                tracing::error!(errno = code, error = %msg, "Internal server error")
            }
        }

        (status, Json(ErrorResponse::new(code, msg))).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::InvalidInput(msg) => ApiError::BadRequest(msg),
            ApplicationError::NotFound(msg) => ApiError::NotFound(msg),
            ApplicationError::CollaboratorFailure(msg) => ApiError::BadGateway(msg),
            ApplicationError::CacheFailure(msg) => ApiError::Internal(msg),
            ApplicationError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_matches_errno() {
        let cases = [
            (ApplicationError::invalid("empty text"), StatusCode::BAD_REQUEST),
            (ApplicationError::not_found("Voice", "x"), StatusCode::NOT_FOUND),
            (ApplicationError::collaborator("tts down"), StatusCode::BAD_GATEWAY),
            (ApplicationError::CacheFailure("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApplicationError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            let api: ApiError = err.into();
            let (got, code, _) = api.parts();
            assert_eq!(got, status);
            assert_eq!(code as u16, status.as_u16());
        }
    }
}
