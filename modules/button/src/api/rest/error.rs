use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::rest::dto::ErrorDto;
use crate::domain::error::PressError;

/// Client-facing text for infrastructure failures; details only go to the log.
pub const STORAGE_UNAVAILABLE: &str = "Storage is temporarily unavailable, please retry";

/// Map domain errors to HTTP status codes
pub fn map_press_error(error: &PressError) -> (StatusCode, String) {
    match error {
        PressError::UnknownUser { .. }
        | PressError::ButtonExpired
        | PressError::PressedTwiceInARow
        | PressError::PressedTooSoon => (StatusCode::BAD_REQUEST, error.to_string()),
        PressError::Storage { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            STORAGE_UNAVAILABLE.to_string(),
        ),
    }
}

impl IntoResponse for PressError {
    fn into_response(self) -> Response {
        let (status, message) = map_press_error(&self);
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        }
        (status, Json(ErrorDto { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_are_bad_requests_with_their_message() {
        let (status, msg) = map_press_error(&PressError::PressedTooSoon);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "You must wait 15s between button presses.");

        let (status, _) = map_press_error(&PressError::unknown_user("x"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_details_are_not_exposed() {
        let (status, msg) = map_press_error(&PressError::storage("password authentication failed"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(msg, STORAGE_UNAVAILABLE);
    }
}
