//! Application startup and lifecycle management.
//!
//! Collaborators (document store, push provider) are created once here and
//! shared with every request through [`AppState`].

use crate::config::PetAlertConfig;
use crate::handlers::{health_check, metrics_endpoint, readiness_check, send_pet_alert};
use crate::services::{
    AlertDispatcher, FcmProvider, MockPushProvider, PetDb, PetDirectory, PushProvider,
};
use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn PetDirectory>,
    pub push_provider: Arc<dyn PushProvider>,
    pub dispatcher: AlertDispatcher,
}

impl AppState {
    pub fn new(directory: Arc<dyn PetDirectory>, push_provider: Arc<dyn PushProvider>) -> Self {
        Self {
            dispatcher: AlertDispatcher::new(directory.clone(), push_provider.clone()),
            directory,
            push_provider,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/sendPetAlert", any(send_pet_alert))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_endpoint))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: PetAlertConfig) -> Result<Self, AppError> {
        let db = PetDb::connect(&config.mongodb).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            e
        })?;

        let push_provider: Arc<dyn PushProvider> = if config.fcm.enabled {
            let provider = FcmProvider::new(config.fcm.clone()).map_err(|e| {
                tracing::error!("Failed to initialize FCM provider: {}", e);
                AppError::ConfigError(anyhow::anyhow!(e))
            })?;
            tracing::info!("FCM push provider initialized");
            Arc::new(provider)
        } else {
            tracing::info!("FCM provider disabled, using mock push provider");
            Arc::new(MockPushProvider::new())
        };

        Self::with_state(config, AppState::new(Arc::new(db), push_provider)).await
    }

    /// Bind the listener for already constructed collaborators.
    ///
    /// Port 0 picks a random free port.
    pub async fn with_state(config: PetAlertConfig, state: AppState) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Pet alert service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
