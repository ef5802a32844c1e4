//! service-core: Shared infrastructure for the pet alert services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
