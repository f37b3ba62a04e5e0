//! Product repository over a [`DocumentStore`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use mongodb::bson::doc;
use pagination::{DEFAULT_MAX_PAGE_SIZE, Page, PageRequest};
use tracing::{Instrument, Span, debug, info};

use crate::domain::ports::{IdentifierAllocator, ProductRepository, RepositoryError};
use crate::domain::{
    Filter, Product, ProductDraft, Timestamps, build_page, build_search_filter,
};

use super::documents::{
    ProductDocument, UPDATED_AT, product_document, product_fields, to_bson_datetime,
};
use super::repository_support::{current_time, map_store_error, parse_identifier};
use super::store::{DocumentStore, DocumentUpdate};

const ENTITY: &str = "product";

/// Default collection holding product documents.
pub const DEFAULT_PRODUCTS_COLLECTION: &str = "products";

/// [`ProductRepository`] backed by any [`DocumentStore`].
///
/// Every operation runs inside the span supplied at construction.
#[derive(Clone)]
pub struct DocumentProductRepository {
    store: Arc<dyn DocumentStore>,
    allocator: Arc<dyn IdentifierAllocator>,
    clock: Arc<dyn Clock>,
    span: Span,
    collection: String,
    max_page_size: u32,
}

impl DocumentProductRepository {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        allocator: Arc<dyn IdentifierAllocator>,
        clock: Arc<dyn Clock>,
        span: Span,
    ) -> Self {
        Self {
            store,
            allocator,
            clock,
            span,
            collection: DEFAULT_PRODUCTS_COLLECTION.to_owned(),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Ceiling applied to every requested page size.
    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    async fn insert(&self, draft: ProductDraft) -> Result<Product, RepositoryError> {
        draft.validate()?;
        let id = self.allocator.allocate();
        let stamps = Timestamps::stamped(current_time(self.clock.as_ref()));
        let id = self
            .store
            .insert_one(&self.collection, product_document(id, &draft, stamps))
            .await
            .map_err(map_store_error)?;
        info!(collection = %self.collection, %id, "product created");
        Ok(Product::new(id, draft, stamps))
    }

    async fn fetch(&self, id: &str) -> Result<Product, RepositoryError> {
        let parsed = parse_identifier(id)?;
        let document = self
            .store
            .find_one(&self.collection, &Filter::by_id(parsed))
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| RepositoryError::not_found(ENTITY, id))?;
        ProductDocument::decode(document).map_err(map_store_error)
    }

    async fn list(&self, page: PageRequest, search: &str) -> Result<Vec<Product>, RepositoryError> {
        let window = build_page(page, self.max_page_size);
        let documents = self
            .store
            .find(&self.collection, &build_search_filter(search), window)
            .await
            .map_err(map_store_error)?;
        debug!(
            collection = %self.collection,
            page = page.page(),
            limit = window.take(),
            count = documents.len(),
            "listed products"
        );
        documents
            .into_iter()
            .map(|document| ProductDocument::decode(document).map_err(map_store_error))
            .collect()
    }

    async fn replace(&self, id: &str, draft: ProductDraft) -> Result<Product, RepositoryError> {
        let parsed = parse_identifier(id)?;
        draft.validate()?;
        let now = current_time(self.clock.as_ref());
        let update = DocumentUpdate::new(
            product_fields(&draft),
            doc! { UPDATED_AT: to_bson_datetime(now) },
        );
        let document = self
            .store
            .update_one(&self.collection, &Filter::by_id(parsed), &update)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| RepositoryError::not_found(ENTITY, id))?;
        info!(collection = %self.collection, id = %parsed, "product updated");
        ProductDocument::decode(document).map_err(map_store_error)
    }

    async fn remove(&self, id: &str) -> Result<(), RepositoryError> {
        let parsed = parse_identifier(id)?;
        let deleted = self
            .store
            .delete_one(&self.collection, &Filter::by_id(parsed))
            .await
            .map_err(map_store_error)?;
        if deleted == 0 {
            return Err(RepositoryError::not_found(ENTITY, id));
        }
        info!(collection = %self.collection, id = %parsed, "product deleted");
        Ok(())
    }

    async fn count_matching(&self, search: &str) -> Result<u64, RepositoryError> {
        self.store
            .count(&self.collection, &build_search_filter(search))
            .await
            .map_err(map_store_error)
    }

    async fn page_of(
        &self,
        page: PageRequest,
        search: &str,
    ) -> Result<Page<Product>, RepositoryError> {
        let effective = page.clamp_limit(self.max_page_size);
        let items = self.list(effective, search).await?;
        let total = self.count_matching(search).await?;
        Ok(Page::new(items, effective, total))
    }
}

#[async_trait]
impl ProductRepository for DocumentProductRepository {
    async fn create(&self, draft: ProductDraft) -> Result<Product, RepositoryError> {
        self.insert(draft).instrument(self.span.clone()).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Product, RepositoryError> {
        self.fetch(id).instrument(self.span.clone()).await
    }

    async fn find_all(
        &self,
        page: PageRequest,
        search: &str,
    ) -> Result<Vec<Product>, RepositoryError> {
        self.list(page, search).instrument(self.span.clone()).await
    }

    async fn update(&self, id: &str, draft: ProductDraft) -> Result<Product, RepositoryError> {
        self.replace(id, draft).instrument(self.span.clone()).await
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.remove(id).instrument(self.span.clone()).await
    }

    async fn count(&self, search: &str) -> Result<u64, RepositoryError> {
        self.count_matching(search)
            .instrument(self.span.clone())
            .await
    }

    async fn find_page(
        &self,
        page: PageRequest,
        search: &str,
    ) -> Result<Page<Product>, RepositoryError> {
        self.page_of(page, search)
            .instrument(self.span.clone())
            .await
    }
}

#[cfg(test)]
mod tests {
    //! Error mapping coverage with a mocked document store.

    use super::*;
    use rstest::{fixture, rstest};

    use crate::domain::ports::FixtureIdentifierAllocator;
    use crate::outbound::persistence::store::{MockDocumentStore, StoreError};
    use crate::test_support::{FixtureClock, utc};

    #[fixture]
    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixtureClock::new(utc(2024, 1, 5, 0, 0, 0)))
    }

    fn repository(store: MockDocumentStore, clock: Arc<dyn Clock>) -> DocumentProductRepository {
        DocumentProductRepository::new(
            Arc::new(store),
            Arc::new(FixtureIdentifierAllocator::starting_at(0x6597_4400)),
            clock,
            Span::none(),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_ids_never_reach_the_store(clock: Arc<dyn Clock>) {
        let mut store = MockDocumentStore::new();
        store.expect_find_one().never();
        store.expect_update_one().never();
        store.expect_delete_one().never();
        let repo = repository(store, clock);

        let draft = ProductDraft::new("Hammer", "tools", 1.0, 1);
        assert_eq!(
            repo.find_by_id("xyz").await,
            Err(RepositoryError::invalid_id("xyz"))
        );
        assert_eq!(
            repo.update("xyz", draft).await,
            Err(RepositoryError::invalid_id("xyz"))
        );
        assert_eq!(
            repo.delete("xyz").await,
            Err(RepositoryError::invalid_id("xyz"))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_drafts_never_reach_the_store(clock: Arc<dyn Clock>) {
        let mut store = MockDocumentStore::new();
        store.expect_insert_one().never();
        let repo = repository(store, clock);

        let err = repo
            .create(ProductDraft::new("", "tools", 1.0, 1))
            .await
            .expect_err("empty name");
        assert!(matches!(err, RepositoryError::Validation { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn store_failures_map_to_store_errors(clock: Arc<dyn Clock>) {
        let mut store = MockDocumentStore::new();
        store
            .expect_count()
            .times(1)
            .returning(|_, _| Err(StoreError::connection("no primary")));
        let repo = repository(store, clock);

        let err = repo.count("").await.expect_err("store failure");
        assert_eq!(
            err,
            RepositoryError::store("document store connection failed: no primary")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn create_writes_to_configured_collection(clock: Arc<dyn Clock>) {
        let mut store = MockDocumentStore::new();
        store
            .expect_insert_one()
            .withf(|collection, document| {
                collection == "catalogue"
                    && document.get_str("name").is_ok_and(|name| name == "Hammer")
            })
            .times(1)
            .returning(|_, document| {
                let id = document.get_object_id("_id").expect("allocated id");
                Ok(crate::domain::Identifier::from_bytes(id.bytes()))
            });
        let repo = repository(store, clock).with_collection("catalogue");

        let product = repo
            .create(ProductDraft::new("Hammer", "tools", 12.5, 3))
            .await
            .expect("create product");
        assert_eq!(product.id().to_string(), "659744000000000000000000");
        assert_eq!(product.created_at(), product.updated_at());
    }

    #[rstest]
    #[tokio::test]
    async fn decode_failures_surface_as_store_errors(clock: Arc<dyn Clock>) {
        let mut store = MockDocumentStore::new();
        store
            .expect_find_one()
            .times(1)
            .returning(|_, _| Ok(Some(doc! { "name": "orphan" })));
        let repo = repository(store, clock);

        let err = repo
            .find_by_id("65973e000102030405060708")
            .await
            .expect_err("undecodable document");
        assert!(matches!(err, RepositoryError::Store { .. }));
    }
}
