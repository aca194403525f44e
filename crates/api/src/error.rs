//! Error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use orgkas_shared::{AppError, Outcome};
use tracing::error;

/// An [`AppError`] on its way to the client.
///
/// Renders as the tagged outcome `{ "success": false, "message", "error" }`
/// with the matching status. Server-side failures are logged here and
/// reported without details.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if matches!(self.0, AppError::Database(_) | AppError::Internal(_)) {
            error!(error = %self.0, "Request failed");
        }
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(Outcome::from(&self.0))).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// A `200 OK` tagged outcome with a message.
pub fn done(message: &str) -> (StatusCode, Json<Outcome>) {
    (StatusCode::OK, Json(Outcome::ok(message)))
}

/// A tagged outcome carrying the stored record.
///
/// # Errors
///
/// Returns `AppError::Internal` if the record cannot be serialized.
pub fn saved<T: serde::Serialize>(
    status: StatusCode,
    message: &str,
    data: &T,
) -> ApiResult<(StatusCode, Json<Outcome>)> {
    let value = serde_json::to_value(data).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok((status, Json(Outcome::with_data(message, value))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_error_renders_outcome() {
        let response = ApiError(AppError::NotFound("Member not found: 4".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let outcome: Outcome = serde_json::from_slice(&body).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Member not found: 4");
        assert_eq!(outcome.error.as_deref(), Some("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_database_error_is_masked() {
        let response = ApiError(AppError::Database("relation missing".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let outcome: Outcome = serde_json::from_slice(&body).unwrap();
        assert_eq!(outcome.message, "An error occurred");
    }
}
