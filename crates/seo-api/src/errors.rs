use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use seo_types::AuditError;
use serde_json::json;

/// Wraps [`AuditError`] so it can implement [`IntoResponse`] without this
/// crate owning the core error type (§4.9: 400 for input errors, 500 for
/// internal failure).
pub struct ApiError(pub AuditError);

impl From<AuditError> for ApiError {
    fn from(err: AuditError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}
