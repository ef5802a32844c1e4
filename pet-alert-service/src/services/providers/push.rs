use super::service_account::{AccessTokenSource, ServiceAccountKey};
use super::{ProviderError, ProviderResponse, PushMessage, PushProvider};
use crate::config::FcmConfig;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

const FCM_API_URL: &str = "https://fcm.googleapis.com/v1/projects";

pub struct FcmProvider {
    project_id: String,
    client: Client,
    tokens: AccessTokenSource,
}

#[derive(Debug, Serialize)]
struct FcmRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    token: &'a str,
    notification: FcmNotification<'a>,
    #[serde(skip_serializing_if = "no_data")]
    data: &'a HashMap<String, String>,
}

fn no_data(data: &&HashMap<String, String>) -> bool {
    data.is_empty()
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

impl<'a> FcmRequest<'a> {
    fn from_push(push: &'a PushMessage) -> Self {
        Self {
            message: FcmMessage {
                token: &push.device_token,
                notification: FcmNotification {
                    title: &push.title,
                    body: &push.body,
                },
                data: &push.data,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct FcmResponse {
    name: Option<String>,
    #[serde(default)]
    error: Option<FcmError>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct FcmError {
    code: i32,
    message: String,
    status: String,
}

impl FcmProvider {
    /// Parses the configured service account. The project id falls back to
    /// the one embedded in the key when the config leaves it empty.
    pub fn new(config: FcmConfig) -> Result<Self, ProviderError> {
        let key = ServiceAccountKey::from_json(config.service_account_key.expose_secret())?;

        let project_id = if config.project_id.is_empty() {
            key.project_id.clone().unwrap_or_default()
        } else {
            config.project_id.clone()
        };

        if project_id.is_empty() {
            return Err(ProviderError::Configuration(
                "FCM project_id is not configured".to_string(),
            ));
        }

        let client = Client::new();
        Ok(Self {
            project_id,
            tokens: AccessTokenSource::new(key, client.clone()),
            client,
        })
    }

    fn send_url(&self) -> String {
        format!("{}/{}/messages:send", FCM_API_URL, self.project_id)
    }
}

#[async_trait]
impl PushProvider for FcmProvider {
    async fn send(&self, push: &PushMessage) -> Result<ProviderResponse, ProviderError> {
        let access_token = self.tokens.access_token().await?;
        let request = FcmRequest::from_push(push);

        let response = self
            .client
            .post(self.send_url())
            .bearer_auth(&access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(format!("Failed to connect to FCM: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::SendFailed(format!(
                "FCM API returned error status {}: {}",
                status, body
            )));
        }

        let fcm_response: FcmResponse = response.json().await.map_err(|e| {
            ProviderError::SendFailed(format!("Failed to parse FCM response: {}", e))
        })?;

        if let Some(error) = fcm_response.error {
            return Err(ProviderError::SendFailed(format!(
                "FCM error ({}): {}",
                error.status, error.message
            )));
        }

        tracing::info!(
            message_name = ?fcm_response.name,
            "Push notification sent successfully via FCM"
        );

        Ok(ProviderResponse::success(fcm_response.name))
    }
}

/// Push provider that records messages instead of sending them.
///
/// Used when FCM is disabled and by the integration tests.
pub struct MockPushProvider {
    failure: Option<String>,
    send_count: AtomicU64,
    sent: Mutex<Vec<PushMessage>>,
}

impl MockPushProvider {
    pub fn new() -> Self {
        Self {
            failure: None,
            send_count: AtomicU64::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// A provider whose every send is rejected with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    pub fn sent_messages(&self) -> Vec<PushMessage> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for MockPushProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushProvider for MockPushProvider {
    async fn send(&self, push: &PushMessage) -> Result<ProviderResponse, ProviderError> {
        let count = self.send_count.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(message) = &self.failure {
            return Err(ProviderError::SendFailed(message.clone()));
        }

        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(push.clone());

        tracing::info!(
            title = %push.title,
            data = ?push.data,
            "[MOCK] Push notification would be sent"
        );

        Ok(ProviderResponse::success(Some(format!("mock-push-{}", count))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;
    use serde_json::json;

    fn message() -> PushMessage {
        let mut data = HashMap::new();
        data.insert("petId".to_string(), "p1".to_string());
        data.insert(
            "click_action".to_string(),
            "FLUTTER_NOTIFICATION_CLICK".to_string(),
        );
        PushMessage {
            device_token: "tok-abc".to_string(),
            title: "Hot!".to_string(),
            body: "41°C".to_string(),
            data,
        }
    }

    #[test]
    fn test_fcm_request_shape() {
        let push = message();
        let value = serde_json::to_value(FcmRequest::from_push(&push)).unwrap();

        assert_eq!(
            value,
            json!({
                "message": {
                    "token": "tok-abc",
                    "notification": { "title": "Hot!", "body": "41°C" },
                    "data": {
                        "petId": "p1",
                        "click_action": "FLUTTER_NOTIFICATION_CLICK"
                    }
                }
            })
        );
    }

    #[test]
    fn test_fcm_request_omits_empty_data() {
        let push = PushMessage {
            data: HashMap::new(),
            ..message()
        };
        let value = serde_json::to_value(FcmRequest::from_push(&push)).unwrap();
        assert!(value["message"].get("data").is_none());
    }

    #[test]
    fn test_fcm_provider_uses_project_from_key() {
        let config = FcmConfig {
            project_id: String::new(),
            service_account_key: Secret::new(
                json!({
                    "project_id": "petcare-app",
                    "private_key": "unused",
                    "client_email": "alerts@petcare-app.iam.gserviceaccount.com"
                })
                .to_string(),
            ),
            enabled: true,
        };

        let provider = FcmProvider::new(config).unwrap();
        assert_eq!(
            provider.send_url(),
            "https://fcm.googleapis.com/v1/projects/petcare-app/messages:send"
        );
    }

    #[test]
    fn test_fcm_provider_requires_credentials() {
        let config = FcmConfig {
            project_id: "petcare-app".to_string(),
            service_account_key: Secret::new(String::new()),
            enabled: true,
        };

        assert!(matches!(
            FcmProvider::new(config),
            Err(ProviderError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_records_messages() {
        let provider = MockPushProvider::new();
        let response = provider.send(&message()).await.unwrap();

        assert_eq!(response.provider_id.as_deref(), Some("mock-push-1"));
        assert_eq!(provider.send_count(), 1);
        assert_eq!(provider.sent_messages(), vec![message()]);
    }

    #[tokio::test]
    async fn test_failing_mock_rejects() {
        let provider = MockPushProvider::failing("registration-token-not-registered");
        let result = provider.send(&message()).await;

        assert!(matches!(result, Err(ProviderError::SendFailed(_))));
        assert_eq!(provider.send_count(), 1);
        assert!(provider.sent_messages().is_empty());
    }
}
