//! HTTP handlers for pet-alert-service.

pub mod alert;
pub mod health;

pub use alert::{send_pet_alert, SUCCESS_MESSAGE};
pub use health::{health_check, metrics_endpoint, readiness_check};
