use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{}", .0.user_message())]
    Upstream(#[from] QuizApiError),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Upstream(_) => "UPSTREAM_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    pub kind: &'static str,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            code: self.status_code().as_u16(),
            kind: self.error_code(),
        })
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Structured failure kinds for the upstream quiz API. The classifier in
/// `clients::quiz_api` maps status codes and payload markers onto these
/// variants once, at the boundary; everything downstream matches on the
/// enum instead of sniffing message strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizApiError {
    #[error("upstream quota exhausted")]
    QuotaExceeded,

    #[error("upstream AI model unavailable")]
    ModelUnavailable,

    #[error("upstream server fault (status {0})")]
    Server(u16),

    #[error("upstream rejected request payload: {0}")]
    Validation(String),

    #[error("network failure: {0}")]
    Network(String),

    #[error("upstream request timed out")]
    Timeout,

    #[error("unexpected upstream response: {0}")]
    Unexpected(String),
}

impl QuizApiError {
    /// Human-readable explanation surfaced to the frontend.
    pub fn user_message(&self) -> String {
        match self {
            QuizApiError::QuotaExceeded => "API Quota Exceeded: The AI service has reached \
                its daily limit. Please try again tomorrow or contact support to upgrade the plan."
                .to_string(),
            QuizApiError::ModelUnavailable => "AI Service Error: The quiz service is having \
                issues with the AI model. Please contact support or try again later."
                .to_string(),
            QuizApiError::Server(_) => "The evaluation service is currently experiencing \
                issues. This is a temporary problem on our end."
                .to_string(),
            QuizApiError::Validation(_) => {
                "Invalid data format. Please refresh and try again.".to_string()
            }
            QuizApiError::Network(_) => {
                "Network error. Please check your internet connection and try again.".to_string()
            }
            QuizApiError::Timeout => {
                "Request timed out. The server is taking too long to respond.".to_string()
            }
            QuizApiError::Unexpected(detail) => {
                format!("The quiz service returned an unexpected response: {}", detail)
            }
        }
    }
}
