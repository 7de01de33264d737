use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use emporium::{AuthError, Error};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("This email is blocked, try again later")]
    AccountLocked,

    #[error("Wrong email or password")]
    InvalidCredentials,

    #[error("Wrong password")]
    WrongPassword,

    #[error("Password confirmation mismatched")]
    PasswordMismatch,

    #[error("Email is already registered")]
    EmailAlreadyRegistered,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(&'static str),

    /// A write the store did not accept.
    #[error("{0}")]
    Unprocessable(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Auth(AuthError::AccountLocked) => ApiError::AccountLocked,
            Error::Auth(AuthError::InvalidCredentials) => ApiError::InvalidCredentials,
            Error::Auth(AuthError::WrongPassword) => ApiError::WrongPassword,
            Error::Auth(AuthError::PasswordMismatch) => ApiError::PasswordMismatch,
            Error::Auth(AuthError::EmailAlreadyRegistered) => ApiError::EmailAlreadyRegistered,
            Error::Auth(AuthError::InvalidToken(reason)) => {
                tracing::debug!(reason = %reason, "Rejected bearer token");
                ApiError::Unauthorized
            }
            Error::Validation(e) => ApiError::BadRequest(e.to_string()),
            e @ (Error::Storage(_) | Error::Crypto(_)) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::AccountLocked => StatusCode::FORBIDDEN,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::WrongPassword => StatusCode::UNAUTHORIZED,
            ApiError::PasswordMismatch => StatusCode::FORBIDDEN,
            ApiError::EmailAlreadyRegistered => StatusCode::CONFLICT,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Store and crypto details stay in the log
        let error_message = match self {
            ApiError::InternalError(ref msg) => {
                tracing::error!(error = %msg, "Request failed");
                "Internal server error".to_string()
            }
            ref other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
