use crate::error::AppError;
use crate::models::MAX_SESSION_MINUTES;
use rocket::form::Form;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::instrument;
use validator::{Validate, ValidationError};

/// JSON body of every failed API call.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub errors: HashMap<String, Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: &str, errors: HashMap<String, Vec<String>>) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            errors,
        }
    }

    pub fn with_error(field: &str, message: &str) -> Self {
        let mut errors = HashMap::new();
        errors.insert(field.to_string(), vec![message.to_string()]);
        Self::new(message, errors)
    }
}

pub type ApiError = Custom<Json<ErrorResponse>>;

pub trait ToErrorResponse {
    fn to_error_response(self) -> ApiError;
}

impl ToErrorResponse for AppError {
    fn to_error_response(self) -> ApiError {
        self.log_and_record("API error");
        let status = self.status_code();

        let field = match &self {
            AppError::Database(_) => "database",
            AppError::NotFound(_) => "resource",
            AppError::Validation(_) => "request",
            AppError::Upload(_) => "image",
            AppError::Internal(_) => "server",
        };

        Custom(
            status,
            Json(ErrorResponse::with_error(field, &self.public_message())),
        )
    }
}

impl ToErrorResponse for Status {
    #[instrument]
    fn to_error_response(self) -> ApiError {
        let (field, message) = match self.code {
            404 => ("resource", "Resource not found"),
            400 => ("request", "Bad request"),
            422 => ("validation", "Validation failed"),
            413 => ("request", "Upload exceeds the size limit"),
            500 => ("server", "Internal server error"),
            503 => ("service", "Service unavailable"),
            _ => ("error", "An error occurred"),
        };

        Custom(self, Json(ErrorResponse::with_error(field, message)))
    }
}

/// Field errors keyed by the names the form was submitted with.
#[derive(Debug)]
pub struct ValidationErrorWrapper(pub HashMap<String, Vec<String>>);

impl ValidationErrorWrapper {
    pub fn for_form<T: FormFields>(errors: &validator::ValidationErrors) -> Self {
        let mut error_map = HashMap::new();

        for (field, field_errors) in errors.field_errors() {
            let error_messages: Vec<String> = field_errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .clone()
                        .unwrap_or_else(|| "Invalid value".into())
                        .to_string()
                })
                .collect();

            error_map.insert(T::wire_name(&field).to_string(), error_messages);
        }

        Self(error_map)
    }
}

impl From<ValidationErrorWrapper> for ApiError {
    #[instrument]
    fn from(wrapper: ValidationErrorWrapper) -> Self {
        let error_map = wrapper.0;

        tracing::warn!(errors = ?error_map, "Form validation failed");

        Custom(
            Status::UnprocessableEntity,
            Json(ErrorResponse::new("Validation failed", error_map)),
        )
    }
}

/// Maps struct fields to the names a form submits them under.
pub trait FormFields {
    fn wire_name(field: &str) -> &str {
        field
    }
}

/// Runs `validator` rules on a submitted form and unwraps it.
pub trait FormValidateExt<T> {
    fn validated(self) -> Result<T, ApiError>;
}

impl<T: Validate + FormFields> FormValidateExt<T> for Form<T> {
    fn validated(self) -> Result<T, ApiError> {
        let inner = self.into_inner();
        inner
            .validate()
            .map_err(|errors| ApiError::from(ValidationErrorWrapper::for_form::<T>(&errors)))?;
        Ok(inner)
    }
}

/// Turns an [`AppError`] result into the JSON error response.
pub trait AppErrorExt<T> {
    fn or_error_response(self) -> Result<T, ApiError>;
}

impl<T> AppErrorExt<T> for Result<T, AppError> {
    fn or_error_response(self) -> Result<T, ApiError> {
        self.map_err(ToErrorResponse::to_error_response)
    }
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Form rule for a duration field, reporting what [`parse_duration`] rejects.
pub fn session_minutes(value: &str) -> Result<(), ValidationError> {
    parse_duration(value).map(|_| ()).map_err(|err| {
        ValidationError::new("duration").with_message(Cow::Owned(err.public_message()))
    })
}

/// Sessions last between one minute and [`MAX_SESSION_MINUTES`]. The upper
/// bound keeps per-course totals inside SQLite's integer range.
pub fn check_session_minutes(minutes: i64) -> Result<(), AppError> {
    if minutes <= 0 {
        return Err(AppError::Validation(format!(
            "Duration must be a positive number of minutes, got {}",
            minutes
        )));
    }
    if minutes > MAX_SESSION_MINUTES {
        return Err(AppError::Validation(format!(
            "Duration must be at most {} minutes, got {}",
            MAX_SESSION_MINUTES, minutes
        )));
    }
    Ok(())
}

/// Parses a submitted duration as whole minutes within the session bounds.
pub fn parse_duration(raw: &str) -> Result<i64, AppError> {
    let minutes = raw.trim().parse::<i64>().map_err(|_| {
        AppError::Validation(format!(
            "Duration must be a whole number of minutes, got {:?}",
            raw
        ))
    })?;

    check_session_minutes(minutes)?;

    Ok(minutes)
}
