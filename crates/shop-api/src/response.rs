//! # Response Envelope
//!
//! Every endpoint answers `{success, data?, errors?, message?}`. Failures
//! carry the HTTP status, the coarse error category in `message`, and the
//! human-readable text in `errors.message`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use shop_core::ShopError;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ErrorBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Successful envelope with data and a human-readable message
pub fn respond<T: Serialize>(data: T, message: impl Into<String>) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data: Some(data),
        errors: None,
        message: Some(message.into()),
    })
}

/// Error wrapper so handlers can `?` a `ShopError` straight into a response
#[derive(Debug)]
pub struct ApiError(pub ShopError);

impl From<ShopError> for ApiError {
    fn from(err: ShopError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body: ApiResponse<()> = ApiResponse {
            success: false,
            data: None,
            errors: Some(ErrorBody {
                message: self.0.to_string(),
            }),
            message: Some(self.0.category().to_string()),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let json = serde_json::to_value(&*respond(42, "done")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 42);
        assert_eq!(json["message"], "done");
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn test_error_envelope_carries_category() {
        let err = ApiError(ShopError::CartNotFound);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
