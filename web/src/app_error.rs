use std::fmt;

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use log::error;
use serde_json::json;
use validator::ValidationErrors;

use crate::{
    media::MediaError,
    utils::result::{self, StdResult},
};

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(json!({ "message": self.message }))
    }
}

impl From<result::Error> for AppError {
    fn from(error: result::Error) -> Self {
        error!(target: "zetta", "ERROR: {:#}", error);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    }
}

impl From<MediaError> for AppError {
    fn from(error: MediaError) -> Self {
        if error.is_not_found() {
            Self::not_found("Image not found")
        } else {
            error!(target: "zetta", "ERROR: {}", error);
            Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_values()
            .flatten()
            .map(|e| match &e.message {
                Some(message) => message.to_string(),
                None => e.code.to_string(),
            })
            .collect();
        messages.sort();
        Self::bad_request(messages.join(", "))
    }
}

pub type Response<T = HttpResponse> = StdResult<T, AppError>;

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use validator::Validate;

    #[derive(Validate)]
    struct Body {
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
    }

    #[test]
    fn test_validation_message() {
        let err: AppError = Body { name: String::new() }.validate().unwrap_err().into();
        assert_eq!(StatusCode::BAD_REQUEST, err.status_code());
        assert_eq!("name is required", err.message());
    }

    #[test]
    fn test_media_not_found() {
        let err: AppError = MediaError::Unrecoverable("1-icon.png".into()).into();
        assert_eq!(StatusCode::NOT_FOUND, err.status_code());
        assert_eq!("Image not found", err.message());
    }

    #[test]
    fn test_internal_hides_detail() {
        let err: AppError = crate::utils::simple_error!("db down").into();
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, err.status_code());
        assert_eq!("Server error", err.message());
    }
}
