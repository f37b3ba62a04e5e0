//! MongoDB-backed document store.
//!
//! Wraps a `mongodb::Database` handle. The driver pools connections
//! internally, so the store is cheap to clone and share between
//! repositories.
//!
//! # Design
//!
//! - Filters and pipelines arrive typed and are translated here
//! - Cursors are drained with `try_collect`, which releases them on every path
//! - Driver errors are logged at `debug` and flattened into [`StoreError`]

use std::time::Duration;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{Document, doc};
use mongodb::error::{Error as DriverError, ErrorKind};
use mongodb::options::{ClientOptions, ReturnDocument};
use mongodb::{Client, Collection, Database};
use pagination::PageWindow;
use tracing::{debug, info};

use crate::domain::{Filter, Identifier};

use super::documents::{ID, identifier};
use super::pipeline::Pipeline;
use super::query_translation::filter_to_document;
use super::store::{DocumentStore, DocumentUpdate, StoreError};

/// Connection parameters for [`MongoDocumentStore`].
///
/// # Example
///
/// ```ignore
/// let config = StoreConfig::new("mongodb://localhost:27017")
///     .with_database("storefront")
///     .with_connect_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    uri: String,
    database: String,
    connect_timeout: Duration,
}

impl StoreConfig {
    /// Create a configuration for `uri`.
    ///
    /// Defaults: database `storefront`, 20 second connect timeout.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: "storefront".to_owned(),
            connect_timeout: Duration::from_secs(20),
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Bound on both the initial connect and server selection.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

/// [`DocumentStore`] backed by a MongoDB database.
#[derive(Debug, Clone)]
pub struct MongoDocumentStore {
    database: Database,
}

impl MongoDocumentStore {
    /// Connect and verify the deployment answers a `ping`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` when the URI is malformed or no
    /// server responds within the connect timeout.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(config.uri())
            .await
            .map_err(|err| StoreError::connection(err.to_string()))?;
        options.connect_timeout = Some(config.connect_timeout());
        options.server_selection_timeout = Some(config.connect_timeout());

        let client =
            Client::with_options(options).map_err(|err| StoreError::connection(err.to_string()))?;
        let database = client.database(config.database());
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|err| StoreError::connection(err.to_string()))?;

        info!(database = config.database(), "connected to document store");
        Ok(Self { database })
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection::<Document>(name)
    }
}

fn map_driver_error(error: DriverError) -> StoreError {
    debug!(error = %error, "document store operation failed");
    let message = error.to_string();
    match error.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::DnsResolve { .. }
        | ErrorKind::ConnectionPoolCleared { .. } => StoreError::connection(message),
        ErrorKind::BsonDeserialization(_) => StoreError::decode(message),
        _ => StoreError::query(message),
    }
}

fn limit(window: PageWindow) -> i64 {
    i64::try_from(window.take()).unwrap_or(i64::MAX)
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<Identifier, StoreError> {
        let result = self
            .collection(collection)
            .insert_one(document)
            .await
            .map_err(map_driver_error)?;
        result
            .inserted_id
            .as_object_id()
            .map(identifier)
            .ok_or_else(|| StoreError::decode("inserted id is not an object id"))
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        self.collection(collection)
            .find_one(filter_to_document(filter))
            .await
            .map_err(map_driver_error)
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        window: PageWindow,
    ) -> Result<Vec<Document>, StoreError> {
        let cursor = self
            .collection(collection)
            .find(filter_to_document(filter))
            .sort(doc! { ID: 1 })
            .skip(window.skip())
            .limit(limit(window))
            .await
            .map_err(map_driver_error)?;
        cursor.try_collect().await.map_err(map_driver_error)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &DocumentUpdate,
    ) -> Result<Option<Document>, StoreError> {
        self.collection(collection)
            .find_one_and_update(filter_to_document(filter), update.to_document())
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_driver_error)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let result = self
            .collection(collection)
            .delete_one(filter_to_document(filter))
            .await
            .map_err(map_driver_error)?;
        Ok(result.deleted_count)
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.collection(collection)
            .count_documents(filter_to_document(filter))
            .await
            .map_err(map_driver_error)
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<Vec<Document>, StoreError> {
        let cursor = self
            .collection(collection)
            .aggregate(pipeline.to_documents())
            .await
            .map_err(map_driver_error)?;
        cursor.try_collect().await.map_err(map_driver_error)
    }
}
