//! Document-store persistence adapters.
//!
//! This module provides concrete implementations of the domain repository
//! ports on top of a collection-oriented document store, with MongoDB as the
//! production backend.
//!
//! # Architecture
//!
//! The persistence layer follows these principles:
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   stored documents and domain types. Validation lives on the domain drafts.
//! - **Internal documents**: Stored field names and BSON shapes
//!   (`documents.rs`) are implementation details, never exposed to the
//!   domain layer. `ObjectId` does not leave this module.
//! - **Typed queries**: Repositories hand typed filters and pipelines to the
//!   [`DocumentStore`] seam; each store adapter evaluates them its own way.
//! - **Strongly typed errors**: Store failures are mapped to
//!   [`RepositoryError`](crate::domain::ports::RepositoryError) variants.
//!
//! # Example
//!
//! ```ignore
//! use storefront::outbound::persistence::{
//!     DocumentProductRepository, MongoDocumentStore, StoreConfig,
//! };
//!
//! let store = MongoDocumentStore::connect(&StoreConfig::new("mongodb://localhost")).await?;
//! let repo = DocumentProductRepository::new(Arc::new(store), allocator, clock, span);
//! ```

mod document_order_repository;
mod document_product_repository;
mod documents;
mod memory_store;
mod mongo_store;
mod object_id_allocator;
mod pipeline;
mod query_translation;
mod repository_support;
mod store;

pub use document_order_repository::{DEFAULT_ORDERS_COLLECTION, DocumentOrderRepository};
pub use document_product_repository::{DEFAULT_PRODUCTS_COLLECTION, DocumentProductRepository};
pub use memory_store::InMemoryDocumentStore;
pub use mongo_store::{MongoDocumentStore, StoreConfig};
pub use object_id_allocator::ObjectIdAllocator;
pub use pipeline::{Accumulator, Pipeline, SortOrder, Stage, customer_spend_report};
pub use store::{DocumentStore, DocumentUpdate, StoreError};
