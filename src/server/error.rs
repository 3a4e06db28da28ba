//! Error-to-HTTP response conversion.
//!
//! Route handlers return `Result<T, AppError>` so any
//! [`duckflix_common::Error`] can be propagated with `?`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use duckflix_common::Error;
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError(pub Error);

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self.0, "Server error in handler");
        }

        let body = json!({
            "error": self.0.to_string(),
            "code": self.0.code(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duckflix_common::MovieId;

    #[test]
    fn not_found_produces_404() {
        let err = AppError::from(Error::not_found("movie", MovieId::from_number(1)));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn tool_failure_produces_500() {
        let err = AppError::from(Error::tool("mkvmerge", "exit status 2"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn io_errors_convert() {
        let err = AppError::from(std::io::Error::other("boom"));
        assert!(matches!(err.0, Error::Io { .. }));
    }
}
