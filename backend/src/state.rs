//! Wiring of repositories onto a document store.

use std::sync::Arc;

use mockable::Clock;
use tracing::info_span;

use crate::config::StorefrontSettings;
use crate::domain::ports::IdentifierAllocator;
use crate::outbound::persistence::{
    DocumentOrderRepository, DocumentProductRepository, DocumentStore, InMemoryDocumentStore,
    MongoDocumentStore, ObjectIdAllocator, StoreError,
};

/// Product and order repositories sharing one store, allocator and clock.
#[derive(Clone)]
pub struct PersistenceState {
    pub products: DocumentProductRepository,
    pub orders: DocumentOrderRepository,
}

impl PersistenceState {
    /// Connect to MongoDB and build repositories from `settings`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` when the store cannot be reached.
    pub async fn connect(
        settings: &StorefrontSettings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let store = MongoDocumentStore::connect(&settings.store_config()).await?;
        Ok(Self::with_store(
            Arc::new(store),
            Arc::new(ObjectIdAllocator),
            clock,
            settings,
        ))
    }

    /// Repositories over a fresh in-memory store with default settings.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::with_store(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(ObjectIdAllocator),
            clock,
            &StorefrontSettings::defaults(),
        )
    }

    /// Repositories over an arbitrary store and allocator.
    pub fn with_store(
        store: Arc<dyn DocumentStore>,
        allocator: Arc<dyn IdentifierAllocator>,
        clock: Arc<dyn Clock>,
        settings: &StorefrontSettings,
    ) -> Self {
        let products = DocumentProductRepository::new(
            Arc::clone(&store),
            Arc::clone(&allocator),
            Arc::clone(&clock),
            info_span!("products", collection = settings.products_collection()),
        )
        .with_collection(settings.products_collection())
        .with_max_page_size(settings.max_page_size());
        let orders = DocumentOrderRepository::new(
            store,
            allocator,
            clock,
            info_span!("orders", collection = settings.orders_collection()),
        )
        .with_collection(settings.orders_collection())
        .with_max_page_size(settings.max_page_size());
        Self { products, orders }
    }
}
