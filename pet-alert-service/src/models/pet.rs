//! Read-only views over the externally owned `pets` and `users` documents.
//!
//! Only the attributes the alert flow needs are extracted. Values of the
//! wrong BSON type are treated the same as missing ones.

use mongodb::bson::Document;

pub const OWNER_ID_FIELD: &str = "ownerId";
pub const FCM_TOKEN_FIELD: &str = "fcmToken";

#[derive(Debug, Clone, PartialEq)]
pub struct PetRecord {
    pub pet_id: String,
    pub owner_id: Option<String>,
}

impl PetRecord {
    pub fn new(pet_id: impl Into<String>, owner_id: Option<&str>) -> Self {
        Self {
            pet_id: pet_id.into(),
            owner_id: owner_id.map(str::to_string),
        }
    }

    pub fn from_document(pet_id: &str, doc: &Document) -> Self {
        Self::new(pet_id, doc.get_str(OWNER_ID_FIELD).ok())
    }

    /// The owner reference, if it is a non-empty string.
    pub fn owner(&self) -> Option<&str> {
        self.owner_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub user_id: String,
    pub fcm_token: Option<String>,
}

impl UserRecord {
    pub fn new(user_id: impl Into<String>, fcm_token: Option<&str>) -> Self {
        Self {
            user_id: user_id.into(),
            fcm_token: fcm_token.map(str::to_string),
        }
    }

    pub fn from_document(user_id: &str, doc: &Document) -> Self {
        Self::new(user_id, doc.get_str(FCM_TOKEN_FIELD).ok())
    }

    /// The registered device token, if it is a non-empty string.
    pub fn device_token(&self) -> Option<&str> {
        self.fcm_token.as_deref().filter(|token| !token.is_empty())
    }
}
