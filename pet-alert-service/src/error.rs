use crate::services::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use service_core::error::AppError;
use thiserror::Error;

/// Terminal outcomes of a `sendPetAlert` call other than success.
///
/// Every variant maps to exactly one HTTP status and a plain-text body.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Missing parameters: {}", .0.join(", "))]
    MissingParameters(Vec<&'static str>),

    #[error("Pet with ID {0} not found.")]
    PetNotFound(String),

    #[error("Owner with ID {0} not found.")]
    OwnerNotFound(String),

    #[error("Device token for owner {0} not found.")]
    MissingDeviceToken(String),

    #[error("Internal error: {0}")]
    Internal(anyhow::Error),
}

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal error while processing the request.";

impl AlertError {
    pub fn status(&self) -> StatusCode {
        match self {
            AlertError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AlertError::MissingParameters(_) => StatusCode::BAD_REQUEST,
            AlertError::PetNotFound(_) | AlertError::OwnerNotFound(_) => StatusCode::NOT_FOUND,
            AlertError::MissingDeviceToken(_) | AlertError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Label used for the `pet_alert_total` counter.
    pub fn outcome(&self) -> &'static str {
        match self {
            AlertError::MethodNotAllowed => "method_not_allowed",
            AlertError::MissingParameters(_) => "missing_parameters",
            AlertError::PetNotFound(_) => "pet_not_found",
            AlertError::OwnerNotFound(_) => "owner_not_found",
            AlertError::MissingDeviceToken(_) => "missing_device_token",
            AlertError::Internal(_) => "internal_error",
        }
    }
}

impl From<AppError> for AlertError {
    fn from(err: AppError) -> Self {
        AlertError::Internal(anyhow::Error::new(err))
    }
}

impl From<ProviderError> for AlertError {
    fn from(err: ProviderError) -> Self {
        AlertError::Internal(anyhow::Error::new(err))
    }
}

impl IntoResponse for AlertError {
    fn into_response(self) -> Response {
        let body = match &self {
            // The cause stays in the logs; callers get a generic text.
            AlertError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        };

        (self.status(), body).into_response()
    }
}
