use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Query(#[from] QueryRejection),

    #[error("Resource not found: {0}")]
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Store(StoreError::InvalidAddress(_)) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::UnknownAccount(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::AlreadySubscribed(_)) => StatusCode::CONFLICT,
            ApiError::Store(StoreError::ChainUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Query(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
