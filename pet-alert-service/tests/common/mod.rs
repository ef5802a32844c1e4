#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use pet_alert_service::config::{FcmConfig, MongoConfig, PetAlertConfig};
use pet_alert_service::models::{PetRecord, UserRecord};
use pet_alert_service::services::{MockPushProvider, PetDirectory};
use pet_alert_service::startup::{build_router, AppState, Application};
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use service_core::error::AppError;
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tracing_subscriber::fmt::MakeWriter;

/// In-memory stand-in for the pets/users collections.
#[derive(Default)]
pub struct InMemoryDirectory {
    pets: HashMap<String, PetRecord>,
    users: HashMap<String, UserRecord>,
    unavailable: bool,
    lookups: AtomicUsize,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every read fails as if the database were down.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with_pet(mut self, pet_id: &str, owner_id: Option<&str>) -> Self {
        self.pets
            .insert(pet_id.to_string(), PetRecord::new(pet_id, owner_id));
        self
    }

    pub fn with_user(mut self, user_id: &str, fcm_token: Option<&str>) -> Self {
        self.users
            .insert(user_id.to_string(), UserRecord::new(user_id, fcm_token));
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "connection refused"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PetDirectory for InMemoryDirectory {
    async fn find_pet(&self, pet_id: &str) -> Result<Option<PetRecord>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.pets.get(pet_id).cloned())
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<UserRecord>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.users.get(user_id).cloned())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.check_available()
    }
}

/// The standard fixture: pet `p1` owned by `u1`, whose device is `tok-abc`.
pub fn seeded_directory() -> InMemoryDirectory {
    InMemoryDirectory::new()
        .with_pet("p1", Some("u1"))
        .with_user("u1", Some("tok-abc"))
}

pub struct TestContext {
    pub directory: Arc<InMemoryDirectory>,
    pub push: Arc<MockPushProvider>,
    pub router: Router,
}

impl TestContext {
    pub fn new(directory: InMemoryDirectory, push: MockPushProvider) -> Self {
        let directory = Arc::new(directory);
        let push = Arc::new(push);
        let state = AppState::new(directory.clone(), push.clone());

        Self {
            directory,
            push,
            router: build_router(state),
        }
    }

    pub fn seeded() -> Self {
        Self::new(seeded_directory(), MockPushProvider::new())
    }

    pub async fn request(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");

        (
            status,
            String::from_utf8(bytes.to_vec()).expect("Response body is not UTF-8"),
        )
    }

    pub async fn post_json(&self, body: serde_json::Value) -> (StatusCode, String) {
        self.request(
            Request::builder()
                .method("POST")
                .uri("/sendPetAlert")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

/// A real server on a random port, for tests that go over the network.
pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    pub async fn spawn(state: AppState) -> Self {
        let config = PetAlertConfig {
            common: CoreConfig {
                port: 0,
                ..CoreConfig::default()
            },
            mongodb: MongoConfig {
                uri: "mongodb://localhost:27017".to_string(),
                database: "petcare_test".to_string(),
                pets_collection: "pets".to_string(),
                users_collection: "users".to_string(),
            },
            fcm: FcmConfig {
                project_id: "test-project".to_string(),
                service_account_key: Secret::new(String::new()),
                enabled: false,
            },
            otlp_endpoint: "http://localhost:4317".to_string(),
        };

        let app = Application::with_state(config, state)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to accept connections
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, port }
    }
}

/// Collects formatted log lines so tests can assert on what was logged.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Installs a plain-text subscriber writing into this buffer for the
    /// current thread until the guard is dropped.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(|p| p.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
