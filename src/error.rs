use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::calc::AmountParseError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("deletion must be confirmed with ?confirm=true")]
    ConfirmationRequired,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }
}

impl From<AmountParseError> for AppError {
    fn from(e: AmountParseError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ConfirmationRequired => StatusCode::PRECONDITION_REQUIRED,
            AppError::Internal(e) => {
                error!(error = ?e, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_hide_details() {
        let res = AppError::from(anyhow::anyhow!("connection refused on 10.0.0.3")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::Internal(anyhow::anyhow!("boom")).to_string(), "internal error");
    }

    #[test]
    fn maps_statuses() {
        assert_eq!(
            AppError::NotFound("pet").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::ConfirmationRequired.into_response().status(),
            StatusCode::PRECONDITION_REQUIRED
        );
        assert_eq!(
            AppError::from(AmountParseError::Empty).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
