/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body `{message, detail?}`)
 * - RepoError / mutation error を統一的に変換
 * - 500 の detail はログにのみ残し、レスポンスには出さない
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;

pub const RESOURCE_NOT_FOUND: &str =
    "Resource not found or you do not have access to this resource";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {message}")]
    BadRequest {
        message: String,
        detail: Option<String>,
    },
    #[error("unauthorized")]
    Unauthorized,
    /// Used for both a missing resource and a denied one.
    #[error("not found")]
    NotFound,
    #[error("conflict: {message}")]
    Conflict { message: String },
    #[error("precondition failed: {message}")]
    PreconditionFailed {
        message: String,
        detail: Option<String>,
    },
    #[error("internal: {message}")]
    Internal {
        message: String,
        detail: Option<String>,
    },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            detail: None,
        }
    }

    pub fn bad_request_with_detail(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            detail: Some(detail.into()),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn precondition_failed(message: impl Into<String>, detail: Option<String>) -> Self {
        Self::PreconditionFailed {
            message: message.into(),
            detail,
        }
    }

    pub fn internal(message: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Internal {
            message: message.into(),
            detail: Some(err.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::PreconditionFailed { .. } => StatusCode::PRECONDITION_FAILED,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::BadRequest { message, detail }
            | AppError::PreconditionFailed { message, detail } => ErrorResponse { message, detail },
            AppError::Conflict { message } => ErrorResponse {
                message,
                detail: None,
            },
            AppError::Unauthorized => ErrorResponse {
                message: "You must be authenticated to access this resource.".into(),
                detail: None,
            },
            AppError::NotFound => ErrorResponse {
                message: RESOURCE_NOT_FOUND.into(),
                detail: None,
            },
            AppError::Internal { message, detail } => {
                tracing::error!(detail = detail.as_deref().unwrap_or(""), "{message}");
                ErrorResponse {
                    message,
                    detail: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound => AppError::NotFound,
            other => AppError::internal("An internal error occurred.", other),
        }
    }
}
