//! Engine error to HTTP status mapping for the gateway surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use holdover_core::Error;

/// Status presented to the client when an engine operation fails.
///
/// Strategies already absorb the transport failures they can recover
/// from; what reaches this mapping is surfaced deliberately (e.g. a
/// non-stylesheet asset with a dead upstream).
pub fn error_status(err: &Error) -> StatusCode {
    match err {
        Error::InvalidInput(_) | Error::InvalidUrl(_) => StatusCode::BAD_REQUEST,
        Error::FetchFailed(_) | Error::FetchTooLarge(_) => StatusCode::BAD_GATEWAY,
        Error::FetchTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        Error::InstallFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::Database(_) | Error::MigrationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(err: &Error) -> Response {
    (error_status(err), err.to_string()).into_response()
}
