use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::Error;

/// HTTP face of [`Error`].
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        Error::PoolExhausted | Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::InvalidCredentials | Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        Error::InvalidInput(_) | Error::AlreadyExists(_) => StatusCode::BAD_REQUEST,
        Error::Conflict(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);

        let body = match &self.0 {
            e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                error!("Request failed: {}", e);
                json!({ "message": "Internal server error" })
            }
            // The dashboard reads `error` on 401s.
            Error::InvalidCredentials => {
                json!({ "error": "Invalid credentials", "message": "Invalid credentials" })
            }
            Error::Unauthorized(_) => json!({ "error": "Unauthorized", "message": "Unauthorized" }),
            e => json!({ "message": e.to_string() }),
        };

        let mut response = (status, Json(body)).into_response();
        if let Error::RateLimited { retry_after_secs: Some(secs), .. } = &self.0 {
            if let Ok(v) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, v);
            }
        }
        response
    }
}
