use crate::config::MongoConfig;
use crate::models::{PetRecord, UserRecord};
use async_trait::async_trait;
use mongodb::{
    bson::{doc, Document},
    Client as MongoClient, Collection, Database,
};
use service_core::error::AppError;

/// Keyed read access to pet and user documents.
///
/// The alert flow only ever reads through this trait; nothing in the service
/// writes pet or user data.
#[async_trait]
pub trait PetDirectory: Send + Sync {
    async fn find_pet(&self, pet_id: &str) -> Result<Option<PetRecord>, AppError>;
    async fn find_user(&self, user_id: &str) -> Result<Option<UserRecord>, AppError>;
    async fn health_check(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PetDb {
    client: MongoClient,
    db: Database,
    pets_collection: String,
    users_collection: String,
}

impl PetDb {
    pub async fn connect(config: &MongoConfig) -> Result<Self, AppError> {
        tracing::info!(database = %config.database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(&config.uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        let db = client.database(&config.database);
        tracing::info!(
            database = %config.database,
            pets = %config.pets_collection,
            users = %config.users_collection,
            "Successfully connected to MongoDB database"
        );
        Ok(Self {
            client,
            db,
            pets_collection: config.pets_collection.clone(),
            users_collection: config.users_collection.clone(),
        })
    }

    pub fn pets(&self) -> Collection<Document> {
        self.db.collection(&self.pets_collection)
    }

    pub fn users(&self) -> Collection<Document> {
        self.db.collection(&self.users_collection)
    }

    async fn find_by_key(
        &self,
        collection: Collection<Document>,
        key: &str,
    ) -> Result<Option<Document>, AppError> {
        collection
            .find_one(doc! { "_id": key }, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    collection = %collection.name(),
                    key = %key,
                    "Failed to read document: {}",
                    e
                );
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })
    }
}

#[async_trait]
impl PetDirectory for PetDb {
    async fn find_pet(&self, pet_id: &str) -> Result<Option<PetRecord>, AppError> {
        let doc = self.find_by_key(self.pets(), pet_id).await?;
        Ok(doc.map(|doc| PetRecord::from_document(pet_id, &doc)))
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<UserRecord>, AppError> {
        let doc = self.find_by_key(self.users(), user_id).await?;
        Ok(doc.map(|doc| UserRecord::from_document(user_id, &doc)))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }
}
