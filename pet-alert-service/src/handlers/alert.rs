use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode},
};

use crate::error::AlertError;
use crate::models::PetAlert;
use crate::services::record_alert;
use crate::startup::AppState;

pub const SUCCESS_MESSAGE: &str = "Notification sent successfully!";

/// `sendPetAlert`: validates the request, then resolves the pet's owner and
/// pushes the alert to their device.
///
/// Method and body are checked before any lookup.
#[tracing::instrument(skip(state, headers, body), fields(pet_id))]
pub async fn send_pet_alert(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), AlertError> {
    let result = handle(&state, &method, &headers, &body).await;

    match &result {
        Ok(_) => record_alert("sent"),
        Err(e) => {
            if let AlertError::Internal(cause) = e {
                tracing::error!(error = %format!("{:#}", cause), "Error sending pet alert");
            } else {
                tracing::warn!(status = %e.status(), "Pet alert rejected: {}", e);
            }
            record_alert(e.outcome());
        }
    }

    result.map(|_| (StatusCode::OK, SUCCESS_MESSAGE))
}

async fn handle(
    state: &AppState,
    method: &Method,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), AlertError> {
    if *method != Method::POST {
        return Err(AlertError::MethodNotAllowed);
    }

    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let alert = PetAlert::parse(content_type, body)?;
    tracing::Span::current().record("pet_id", alert.pet_id.as_str());

    state.dispatcher.dispatch(&alert).await?;
    Ok(())
}
