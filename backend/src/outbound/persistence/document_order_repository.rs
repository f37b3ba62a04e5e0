//! Order repository and spending report over a [`DocumentStore`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use mongodb::bson::{self, Document, doc};
use pagination::{DEFAULT_MAX_PAGE_SIZE, Page, PageRequest};
use serde::Deserialize;
use tracing::{Instrument, Span, debug, info, warn};

use crate::domain::ports::{IdentifierAllocator, OrderRepository, RepositoryError};
use crate::domain::{
    CustomerReport, Filter, Order, OrderDraft, ReportWindow, Timestamps, build_page,
    build_status_filter,
};

use super::documents::{
    OrderDocument, UPDATED_AT, order_document, order_fields, to_bson_datetime,
};
use super::pipeline::customer_spend_report;
use super::repository_support::{
    current_time, map_aggregation_error, map_store_error, parse_identifier,
};
use super::store::{DocumentStore, DocumentUpdate};

const ENTITY: &str = "order";

/// Default collection holding order documents.
pub const DEFAULT_ORDERS_COLLECTION: &str = "orders";

/// Row emitted by the customer spend pipeline.
#[derive(Debug, Deserialize)]
struct ReportRow {
    #[serde(rename = "_id")]
    customer_id: String,
    total: f64,
    orders: Vec<OrderDocument>,
}

impl ReportRow {
    fn decode(document: Document) -> Result<CustomerReport, RepositoryError> {
        let row: Self = bson::from_document(document)
            .map_err(|err| RepositoryError::aggregation(format!("report row: {err}")))?;
        let orders = row
            .orders
            .into_iter()
            .map(OrderDocument::into_order)
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_aggregation_error)?;
        Ok(CustomerReport {
            customer_id: row.customer_id,
            total: row.total,
            orders,
        })
    }
}

/// [`OrderRepository`] backed by any [`DocumentStore`].
#[derive(Clone)]
pub struct DocumentOrderRepository {
    store: Arc<dyn DocumentStore>,
    allocator: Arc<dyn IdentifierAllocator>,
    clock: Arc<dyn Clock>,
    span: Span,
    collection: String,
    max_page_size: u32,
}

impl DocumentOrderRepository {
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
            collection: DEFAULT_ORDERS_COLLECTION.to_owned(),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    /// Caller totals are stored as given; disagreement is only reported.
    fn check_total(&self, draft: &OrderDraft) {
        if !draft.total_matches_line_items() {
            warn!(
                collection = %self.collection,
                customer_id = %draft.customer_id,
                total_price = draft.total_price,
                line_items_total = draft.line_items_total(),
                "order total does not match its line items"
            );
        }
    }

    async fn insert(&self, draft: OrderDraft) -> Result<Order, RepositoryError> {
        draft.validate()?;
        self.check_total(&draft);
        let id = self.allocator.allocate();
        let stamps = Timestamps::stamped(current_time(self.clock.as_ref()));
        let id = self
            .store
            .insert_one(&self.collection, order_document(id, &draft, stamps))
            .await
            .map_err(map_store_error)?;
        info!(collection = %self.collection, %id, "order created");
        Ok(Order::new(id, draft, stamps))
    }

    async fn fetch(&self, id: &str) -> Result<Order, RepositoryError> {
        let parsed = parse_identifier(id)?;
        let document = self
            .store
            .find_one(&self.collection, &Filter::by_id(parsed))
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| RepositoryError::not_found(ENTITY, id))?;
        OrderDocument::decode(document).map_err(map_store_error)
    }

    async fn list(&self, page: PageRequest, status: &str) -> Result<Vec<Order>, RepositoryError> {
        let window = build_page(page, self.max_page_size);
        let documents = self
            .store
            .find(&self.collection, &build_status_filter(status), window)
            .await
            .map_err(map_store_error)?;
        debug!(
            collection = %self.collection,
            page = page.page(),
            limit = window.take(),
            count = documents.len(),
            "listed orders"
        );
        documents
            .into_iter()
            .map(|document| OrderDocument::decode(document).map_err(map_store_error))
            .collect()
    }

    async fn replace(&self, id: &str, draft: OrderDraft) -> Result<Order, RepositoryError> {
        let parsed = parse_identifier(id)?;
        draft.validate()?;
        self.check_total(&draft);
        let now = current_time(self.clock.as_ref());
        let update = DocumentUpdate::new(
            order_fields(&draft),
            doc! { UPDATED_AT: to_bson_datetime(now) },
        );
        let document = self
            .store
            .update_one(&self.collection, &Filter::by_id(parsed), &update)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| RepositoryError::not_found(ENTITY, id))?;
        info!(collection = %self.collection, id = %parsed, "order updated");
        OrderDocument::decode(document).map_err(map_store_error)
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
        info!(collection = %self.collection, id = %parsed, "order deleted");
        Ok(())
    }

    async fn count_matching(&self, status: &str) -> Result<u64, RepositoryError> {
        self.store
            .count(&self.collection, &build_status_filter(status))
            .await
            .map_err(map_store_error)
    }

    async fn page_of(&self, page: PageRequest, status: &str) -> Result<Page<Order>, RepositoryError> {
        let effective = page.clamp_limit(self.max_page_size);
        let items = self.list(effective, status).await?;
        let total = self.count_matching(status).await?;
        Ok(Page::new(items, effective, total))
    }

    async fn report(&self, window: ReportWindow) -> Result<Vec<CustomerReport>, RepositoryError> {
        let rows = self
            .store
            .aggregate(&self.collection, &customer_spend_report(&window))
            .await
            .map_err(map_aggregation_error)?;
        let reports = rows
            .into_iter()
            .map(ReportRow::decode)
            .collect::<Result<Vec<_>, _>>()?;
        info!(
            collection = %self.collection,
            start = %window.start(),
            end = %window.end(),
            customers = reports.len(),
            "generated spending report"
        );
        Ok(reports)
    }
}

#[async_trait]
impl OrderRepository for DocumentOrderRepository {
    async fn create(&self, draft: OrderDraft) -> Result<Order, RepositoryError> {
        self.insert(draft).instrument(self.span.clone()).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Order, RepositoryError> {
        self.fetch(id).instrument(self.span.clone()).await
    }

    async fn find_all(
        &self,
        page: PageRequest,
        status: &str,
    ) -> Result<Vec<Order>, RepositoryError> {
        self.list(page, status).instrument(self.span.clone()).await
    }

    async fn update(&self, id: &str, draft: OrderDraft) -> Result<Order, RepositoryError> {
        self.replace(id, draft).instrument(self.span.clone()).await
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.remove(id).instrument(self.span.clone()).await
    }

    async fn count(&self, status: &str) -> Result<u64, RepositoryError> {
        self.count_matching(status)
            .instrument(self.span.clone())
            .await
    }

    async fn find_page(
        &self,
        page: PageRequest,
        status: &str,
    ) -> Result<Page<Order>, RepositoryError> {
        self.page_of(page, status)
            .instrument(self.span.clone())
            .await
    }

    async fn generate_report(
        &self,
        window: ReportWindow,
    ) -> Result<Vec<CustomerReport>, RepositoryError> {
        self.report(window).instrument(self.span.clone()).await
    }
}
