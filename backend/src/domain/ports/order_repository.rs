//! Port for customer order persistence and spending reports.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{CustomerReport, Order, OrderDraft, ReportWindow};

use super::RepositoryError;

/// Typed CRUD, status filtering and reporting over the order collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Validate, stamp and persist a new order.
    async fn create(&self, draft: OrderDraft) -> Result<Order, RepositoryError>;

    /// Fetch an order by identifier.
    async fn find_by_id(&self, id: &str) -> Result<Order, RepositoryError>;

    /// List one page of orders with exactly this status. A blank status
    /// lists everything.
    async fn find_all(
        &self,
        page: PageRequest,
        status: &str,
    ) -> Result<Vec<Order>, RepositoryError>;

    /// Replace the mutable fields of an order and bump `updated_at`.
    async fn update(&self, id: &str, draft: OrderDraft) -> Result<Order, RepositoryError>;

    /// Remove an order.
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;

    /// Count orders with `status`, ignoring pagination.
    async fn count(&self, status: &str) -> Result<u64, RepositoryError>;

    /// One page of orders together with the total number of matches.
    async fn find_page(
        &self,
        page: PageRequest,
        status: &str,
    ) -> Result<Page<Order>, RepositoryError>;

    /// Group orders created inside `window` by customer, highest spend first.
    async fn generate_report(
        &self,
        window: ReportWindow,
    ) -> Result<Vec<CustomerReport>, RepositoryError>;
}
