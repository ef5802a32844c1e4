//! pet-alert-service: relays pet alerts to the owner's device via FCM.
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
