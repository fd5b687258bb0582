use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use verzoeken_core::companies::CompanyError;
use verzoeken_core::documents::DocumentError;
use verzoeken_core::expenses::ExpenseError;
use verzoeken_core::users::UserError;
use verzoeken_core::Error as CoreError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    /// A precondition no longer held, e.g. a stale lifecycle transition.
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Expense(ExpenseError::NotFound(m)) => ApiError::NotFound(m),
            CoreError::Expense(ExpenseError::Forbidden(m)) => ApiError::Forbidden(m),
            CoreError::Expense(ExpenseError::InvalidData(m)) => ApiError::BadRequest(m),
            CoreError::Expense(ExpenseError::InvalidTransition(m)) => ApiError::Conflict(m),
            CoreError::User(UserError::NotFound(m)) => ApiError::NotFound(m),
            CoreError::User(UserError::InvalidData(m)) => ApiError::BadRequest(m),
            CoreError::User(UserError::EmailTaken(m)) => ApiError::Conflict(m),
            CoreError::Company(CompanyError::NotFound(m)) => ApiError::NotFound(m),
            CoreError::Document(DocumentError::NotFound(m)) => ApiError::NotFound(m),
            CoreError::Document(DocumentError::InvalidKey(m)) => ApiError::BadRequest(m),
            CoreError::Validation(v) => ApiError::BadRequest(v.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
