use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hike_core::FetchError;
use serde_json::json;

/// Request failures, rendered as `{"error": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Missing request body")]
    MissingBody,

    #[error("Location is required")]
    MissingLocation,

    #[error("Invalid preferences: {0}")]
    InvalidPreferences(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingBody | ApiError::MissingLocation | ApiError::InvalidPreferences(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Fetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
