use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use cartlist_core::errors::Error as CoreError;
use cartlist_core::lists::ListError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Service unavailable")]
    Unavailable,
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Core(CoreError::List(e)) => match e {
                ListError::OpenListExists => (StatusCode::CONFLICT, e.to_string()),
                ListError::NotOpen(_) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
                ListError::ListNotFound | ListError::ItemNotFound => {
                    (StatusCode::NOT_FOUND, e.to_string())
                }
            },
            ApiError::Core(CoreError::Validation(e)) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Core(e) => {
                // Persistence and other internal failures are logged in
                // full but not leaked to the caller.
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
