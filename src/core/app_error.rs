use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

/// Error taxonomy surfaced by every handler. Each variant stays distinct all
/// the way to the HTTP response so the admin UI can render a specific,
/// actionable message instead of a generic failure.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("resource not found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    OutOfStock(String),
    #[error("{0}")]
    InvalidSelection(String),
    #[error("{0}")]
    NotDeliverable(String),
    #[error("{0}")]
    ClosedForOrders(String),
    #[error("{0}")]
    InvalidTransition(String),
    #[error("{0}")]
    ForbiddenResource(String),
    #[error("missing or invalid credentials")]
    Unauthorized,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Unavailable(_) => (StatusCode::CONFLICT, "UNAVAILABLE"),
            AppError::OutOfStock(_) => (StatusCode::CONFLICT, "OUT_OF_STOCK"),
            AppError::InvalidSelection(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_SELECTION")
            }
            AppError::NotDeliverable(_) => (StatusCode::UNPROCESSABLE_ENTITY, "NOT_DELIVERABLE"),
            AppError::ClosedForOrders(_) => (StatusCode::CONFLICT, "CLOSED_FOR_ORDERS"),
            AppError::InvalidTransition(_) => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
            AppError::ForbiddenResource(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Other(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            AppError::Other(err) => {
                tracing::error!("internal error: {err:#}");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "message": message, "code": code }))).into_response()
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => AppError::NotFound,
            other => AppError::Other(other.into()),
        }
    }
}

/// Standard response envelope wrapped around every successful payload.
#[derive(Serialize, ToSchema)]
pub struct StdResponse<T, M> {
    pub data: Option<T>,
    pub message: Option<M>,
}

impl<T, M> IntoResponse for StdResponse<T, M>
where
    T: Serialize,
    M: Serialize,
{
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_distinct_codes() {
        let cases: Vec<(AppError, &str)> = vec![
            (AppError::NotFound, "NOT_FOUND"),
            (AppError::Unavailable("x".into()), "UNAVAILABLE"),
            (AppError::OutOfStock("x".into()), "OUT_OF_STOCK"),
            (AppError::InvalidSelection("x".into()), "INVALID_SELECTION"),
            (AppError::NotDeliverable("x".into()), "NOT_DELIVERABLE"),
            (AppError::ClosedForOrders("x".into()), "CLOSED_FOR_ORDERS"),
            (AppError::InvalidTransition("x".into()), "INVALID_TRANSITION"),
        ];
        let mut seen = std::collections::HashSet::new();
        for (err, expected) in cases {
            let (_, code) = err.status_and_code();
            assert_eq!(code, expected);
            assert!(seen.insert(code), "duplicate error code {code}");
        }
    }

    #[test]
    fn diesel_not_found_becomes_app_not_found() {
        let err: AppError = diesel::result::Error::NotFound.into();
        assert!(matches!(err, AppError::NotFound));
    }
}
