use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct PetAlertConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub fcm: FcmConfig,
    pub otlp_endpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub pets_collection: String,
    pub users_collection: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FcmConfig {
    pub project_id: String,
    /// Raw service-account JSON as downloaded from the Firebase console.
    pub service_account_key: Secret<String>,
    pub enabled: bool,
}

impl PetAlertConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(PetAlertConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", None, is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("petcare"), is_prod)?,
                pets_collection: get_env("MONGODB_PETS_COLLECTION", Some("pets"), is_prod)?,
                users_collection: get_env("MONGODB_USERS_COLLECTION", Some("users"), is_prod)?,
            },
            fcm: FcmConfig {
                project_id: get_env("FCM_PROJECT_ID", Some(""), is_prod)?,
                service_account_key: Secret::new(get_env(
                    "FCM_SERVICE_ACCOUNT_KEY",
                    Some(""),
                    is_prod,
                )?),
                enabled: parse_flag(
                    "FCM_ENABLED",
                    &env::var("FCM_ENABLED").unwrap_or_else(|_| "false".to_string()),
                )?,
            },
            otlp_endpoint: env::var("OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://tempo:4317".to_string()),
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

/// Reads a boolean switch. Values other than true/false, 1/0 and yes/no are
/// rejected so that a typo cannot silently turn a feature off.
fn parse_flag(key: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} must be true or false, got {:?}",
            key,
            other
        ))),
    }
}
