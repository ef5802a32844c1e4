use crate::error::AlertError;
use crate::models::PetAlert;
use crate::services::{PetDirectory, ProviderResponse, PushProvider};
use std::sync::Arc;

/// Resolves pet → owner → device token and hands the alert to the push
/// provider.
///
/// Each step short-circuits the rest, and the push provider is only reached
/// once every lookup has succeeded.
#[derive(Clone)]
pub struct AlertDispatcher {
    directory: Arc<dyn PetDirectory>,
    push_provider: Arc<dyn PushProvider>,
}

impl AlertDispatcher {
    pub fn new(directory: Arc<dyn PetDirectory>, push_provider: Arc<dyn PushProvider>) -> Self {
        Self {
            directory,
            push_provider,
        }
    }

    pub async fn dispatch(&self, alert: &PetAlert) -> Result<ProviderResponse, AlertError> {
        let pet = self
            .directory
            .find_pet(&alert.pet_id)
            .await?
            .ok_or_else(|| AlertError::PetNotFound(alert.pet_id.clone()))?;

        let owner_id = pet.owner().ok_or_else(|| {
            AlertError::Internal(anyhow::anyhow!(
                "Pet {} has no usable ownerId",
                pet.pet_id
            ))
        })?;

        let owner = self
            .directory
            .find_user(owner_id)
            .await?
            .ok_or_else(|| AlertError::OwnerNotFound(owner_id.to_string()))?;

        let device_token = owner
            .device_token()
            .ok_or_else(|| AlertError::MissingDeviceToken(owner.user_id.clone()))?;

        tracing::debug!(
            pet_id = %alert.pet_id,
            owner_id = %owner_id,
            "Resolved alert recipient"
        );

        let message = alert.to_push_message(device_token);
        let response = self.push_provider.send(&message).await?;

        tracing::info!(
            pet_id = %alert.pet_id,
            owner_id = %owner_id,
            provider_id = ?response.provider_id,
            "Pet alert dispatched"
        );

        Ok(response)
    }
}
