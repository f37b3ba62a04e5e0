//! Port for catalogue product persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Product, ProductDraft};

use super::RepositoryError;

/// Typed CRUD and search over the product collection.
///
/// Identifiers cross this boundary as text. Malformed text is rejected with
/// [`RepositoryError::InvalidId`] before the store is touched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Validate, stamp and persist a new product.
    async fn create(&self, draft: ProductDraft) -> Result<Product, RepositoryError>;

    /// Fetch a product by identifier.
    async fn find_by_id(&self, id: &str) -> Result<Product, RepositoryError>;

    /// List one page of products whose name contains `search`
    /// (case-insensitive). A blank term lists everything.
    async fn find_all(
        &self,
        page: PageRequest,
        search: &str,
    ) -> Result<Vec<Product>, RepositoryError>;

    /// Replace the mutable fields of a product and bump `updated_at`.
    async fn update(&self, id: &str, draft: ProductDraft) -> Result<Product, RepositoryError>;

    /// Remove a product.
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;

    /// Count products matching `search`, ignoring pagination.
    async fn count(&self, search: &str) -> Result<u64, RepositoryError>;

    /// One page of products together with the total number of matches.
    async fn find_page(
        &self,
        page: PageRequest,
        search: &str,
    ) -> Result<Page<Product>, RepositoryError>;
}
