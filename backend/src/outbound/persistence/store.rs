//! Document store seam used by the repositories.
//!
//! The store speaks BSON documents but takes typed [`Filter`] and
//! [`Pipeline`] values, so each adapter decides how to evaluate them: the
//! MongoDB adapter translates them into query documents while the in-memory
//! adapter evaluates them directly.

use async_trait::async_trait;
use mongodb::bson::{Document, doc};
use pagination::PageWindow;

use crate::domain::ports::define_port_error;
use crate::domain::{Filter, Identifier};

use super::pipeline::Pipeline;

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum StoreError {
        /// The store could not be reached.
        Connection { message: String } => "document store connection failed: {message}",
        /// The store rejected or failed to execute an operation.
        Query { message: String } => "document store query failed: {message}",
        /// A stored document did not have the expected shape.
        Decode { message: String } => "document decoding failed: {message}",
    }
}

/// Field updates applied by [`DocumentStore::update_one`].
///
/// `set` fields are overwritten unconditionally; `raise` fields are only
/// written when the new value is greater than the stored one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentUpdate {
    set: Document,
    raise: Document,
}

impl DocumentUpdate {
    pub fn new(set: Document, raise: Document) -> Self {
        Self { set, raise }
    }

    pub fn set(&self) -> &Document {
        &self.set
    }

    pub fn raise(&self) -> &Document {
        &self.raise
    }

    /// MongoDB update modifiers (`$set` / `$max`). Empty groups are omitted.
    pub fn to_document(&self) -> Document {
        let mut update = doc! {};
        if !self.set.is_empty() {
            update.insert("$set", self.set.clone());
        }
        if !self.raise.is_empty() {
            update.insert("$max", self.raise.clone());
        }
        update
    }
}

/// Collection-oriented document store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document that already carries its `_id`.
    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<Identifier, StoreError>;

    /// First document matching `filter`.
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError>;

    /// Matching documents in ascending `_id` order, restricted to `window`.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        window: PageWindow,
    ) -> Result<Vec<Document>, StoreError>;

    /// Apply `update` to the first match and return the post-update document.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &DocumentUpdate,
    ) -> Result<Option<Document>, StoreError>;

    /// Delete the first match, returning the number of documents removed.
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Number of documents matching `filter`.
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Run an aggregation pipeline and collect its output rows.
    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<Vec<Document>, StoreError>;
}
