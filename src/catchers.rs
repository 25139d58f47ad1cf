use rocket::Request;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use tracing::warn;

use crate::validation::{ApiError, ErrorResponse, ToErrorResponse};

/// Rocket rejects a form with missing or unparsable fields before any
/// handler runs; answer in the same shape as handler errors.
#[catch(422)]
pub fn unprocessable(req: &Request) -> ApiError {
    warn!("Rejected malformed form for {} {}", req.method(), req.uri());
    Custom(
        Status::UnprocessableEntity,
        Json(ErrorResponse::with_error(
            "request",
            "Missing or malformed form field",
        )),
    )
}

#[catch(default)]
pub fn default_catcher(status: Status, _req: &Request) -> ApiError {
    status.to_error_response()
}
