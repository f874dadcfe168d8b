use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::http::header::{self, ContentType};
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::blockchain::{AppendError, MineError, Rejected};

/// Everything a handler can fail with, mapped onto an HTTP status.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Error parsing request JSON: {0}")]
    BadRequest(String),

    #[error("Invalid block: {0}")]
    Rejected(#[from] Rejected),

    #[error("Error reading request body: {0}")]
    ReadBody(String),

    #[error("Error generating block: {0}")]
    MiningFailed(#[from] MineError),

    #[error("Mining was cancelled")]
    Cancelled,

    #[error("Mining did not finish within {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AppendError> for ApiError {
    fn from(err: AppendError) -> Self {
        match err {
            AppendError::Mine(e) => ApiError::MiningFailed(e),
            AppendError::Rejected(r) => ApiError::Rejected(r),
            AppendError::Cancelled => ApiError::Cancelled,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::BadRequest(_) | ApiError::Rejected(_) => StatusCode::BAD_REQUEST,
            ApiError::ReadBody(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MiningFailed(_) | ApiError::Cancelled | ApiError::Timeout(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut res = HttpResponse::build(self.status_code());
        if matches!(self, ApiError::MethodNotAllowed) {
            res.insert_header((header::ALLOW, "POST"));
        }
        res.content_type(ContentType::plaintext())
            .body(self.to_string())
    }
}
