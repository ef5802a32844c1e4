use crate::error::AlertError;
use crate::services::PushMessage;
use serde_json::Value;
use std::collections::HashMap;
use validator::Validate;

/// Data value the Flutter client uses to route a tapped notification.
pub const FLUTTER_CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Struct field paired with its wire name, in the order missing fields are
/// reported.
const FIELDS: [(&str, &str); 3] = [("pet_id", "petId"), ("title", "title"), ("body", "body")];

/// Alert fields as received from the caller, before validation.
///
/// Values that are not strings are dropped while reading the body, so a
/// `"petId": 7` is reported the same way as an absent `petId`.
#[derive(Debug, Default, Validate)]
pub struct SendPetAlertRequest {
    #[validate(required, length(min = 1))]
    pub pet_id: Option<String>,
    #[validate(required, length(min = 1))]
    pub title: Option<String>,
    #[validate(required, length(min = 1))]
    pub body: Option<String>,
}

impl SendPetAlertRequest {
    /// Reads the request body as a form when the content type says so and as
    /// a JSON object otherwise. Unreadable bodies yield an empty request.
    pub fn from_body(content_type: Option<&str>, body: &[u8]) -> Self {
        let is_form = content_type
            .map(|ct| ct.trim().to_ascii_lowercase().starts_with(FORM_CONTENT_TYPE))
            .unwrap_or(false);

        if is_form {
            Self::from_form(body)
        } else {
            Self::from_json(body)
        }
    }

    fn from_json(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => {
                let field = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
                Self {
                    pet_id: field("petId"),
                    title: field("title"),
                    body: field("body"),
                }
            }
            _ => Self::default(),
        }
    }

    fn from_form(body: &[u8]) -> Self {
        let mut pairs: HashMap<String, String> =
            serde_urlencoded::from_bytes(body).unwrap_or_default();
        Self {
            pet_id: pairs.remove("petId"),
            title: pairs.remove("title"),
            body: pairs.remove("body"),
        }
    }

    pub fn validated(self) -> Result<PetAlert, AlertError> {
        if let Err(errors) = self.validate() {
            let field_errors = errors.field_errors();
            let missing = FIELDS
                .iter()
                .filter(|(field, _)| field_errors.contains_key(*field))
                .map(|(_, wire)| *wire)
                .collect();
            return Err(AlertError::MissingParameters(missing));
        }

        let (Some(pet_id), Some(title), Some(body)) = (self.pet_id, self.title, self.body) else {
            return Err(AlertError::MissingParameters(
                FIELDS.iter().map(|(_, wire)| *wire).collect(),
            ));
        };

        Ok(PetAlert {
            pet_id,
            title,
            body,
        })
    }
}

/// A validated alert: all three fields are non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct PetAlert {
    pub pet_id: String,
    pub title: String,
    pub body: String,
}

impl PetAlert {
    pub fn parse(content_type: Option<&str>, body: &[u8]) -> Result<Self, AlertError> {
        SendPetAlertRequest::from_body(content_type, body).validated()
    }

    pub fn to_push_message(&self, device_token: &str) -> PushMessage {
        let mut data = HashMap::new();
        data.insert("petId".to_string(), self.pet_id.clone());
        data.insert("click_action".to_string(), FLUTTER_CLICK_ACTION.to_string());

        PushMessage {
            device_token: device_token.to_string(),
            title: self.title.clone(),
            body: self.body.clone(),
            data,
        }
    }
}
