use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use vouch::{AccessError, Error};

use crate::types::CookieConfig;

/// Errors rendered to HTTP callers. Authorization failures carry one generic
/// message per endpoint; only validation errors say what was actually wrong.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("Invalid code")]
    InvalidCode,

    #[error("Verification required")]
    VerificationRequired,

    /// The session no longer matches the record; the response instructs the
    /// client to drop the cookie.
    #[error("Session no longer valid")]
    SessionRevoked { clear_cookie: String },

    #[error("Too many requests")]
    RateLimited { retry_after_seconds: Option<u64> },

    #[error("Internal error")]
    Internal,
}

impl ApiError {
    /// Translate a core error, attaching the cookie-clearing header value
    /// where the caller must discard its session.
    pub fn from_error(error: Error, cookie_config: &CookieConfig) -> Self {
        match error {
            Error::Validation(e) => ApiError::Validation(vec![e.to_string()]),
            Error::Access(AccessError::InvalidCode) => ApiError::InvalidCode,
            Error::Access(AccessError::VerificationRequired) => ApiError::VerificationRequired,
            Error::Access(AccessError::SessionRevoked) => ApiError::SessionRevoked {
                clear_cookie: cookie_config.clear_cookie(),
            },
            Error::Access(AccessError::RateLimited {
                retry_after_seconds,
            }) => ApiError::RateLimited {
                retry_after_seconds,
            },
            other => {
                tracing::error!(error = %other, "access operation failed");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "errors": errors })),
            )
                .into_response(),

            ApiError::InvalidCode => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "error": "That code is invalid or has expired"
                })),
            )
                .into_response(),

            ApiError::VerificationRequired => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "success": false,
                    "error": "Verify your email to manage this endorsement"
                })),
            )
                .into_response(),

            ApiError::SessionRevoked { clear_cookie } => (
                StatusCode::UNAUTHORIZED,
                [(header::SET_COOKIE, clear_cookie)],
                Json(json!({
                    "success": false,
                    "error": "Your session is no longer valid. Please verify your email again."
                })),
            )
                .into_response(),

            ApiError::RateLimited {
                retry_after_seconds,
            } => {
                let body = Json(json!({
                    "success": false,
                    "error": "Too many requests. Please try again later."
                }));
                match retry_after_seconds {
                    Some(seconds) => (
                        StatusCode::TOO_MANY_REQUESTS,
                        [(header::RETRY_AFTER, seconds.to_string())],
                        body,
                    )
                        .into_response(),
                    None => (StatusCode::TOO_MANY_REQUESTS, body).into_response(),
                }
            }

            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": "Something went wrong. Please try again."
                })),
            )
                .into_response(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
