//! Behavioural tests for the order repository and spending report over the
//! in-memory store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, doc};
use pagination::PageRequest;
use rstest::{fixture, rstest};
use storefront::{PersistenceState, StorefrontSettings};
use storefront::domain::ports::{OrderRepository, RepositoryError};
use storefront::domain::{
    CustomerReport, Identifier, OrderDraft, OrderStatus, ProductInOrder, ReportWindow,
};
use storefront::outbound::persistence::{
    DEFAULT_ORDERS_COLLECTION, DocumentStore, InMemoryDocumentStore, ObjectIdAllocator,
};
use storefront::test_support::{FixtureClock, SteppingClock, utc};

fn product_id() -> Identifier {
    Identifier::parse("65973e000102030405060708").expect("valid id")
}

fn order(customer: &str, total: f64, status: OrderStatus) -> OrderDraft {
    OrderDraft {
        customer_id: customer.to_owned(),
        products: vec![ProductInOrder::new(product_id(), 1, total)],
        total_price: total,
        order_date: utc(2024, 1, 1, 0, 0, 0),
        status,
    }
}

#[fixture]
fn state() -> PersistenceState {
    PersistenceState::in_memory(Arc::new(FixtureClock::new(utc(2024, 1, 5, 9, 0, 0))))
}

/// Orders created at scripted instants: A spends 150 over two January
/// orders, B spends 200 in one, and C orders only in March.
async fn seeded_report_state() -> PersistenceState {
    let created: [(DateTime<Utc>, &str, f64); 4] = [
        (utc(2024, 1, 5, 10, 0, 0), "A", 100.0),
        (utc(2024, 1, 10, 10, 0, 0), "B", 200.0),
        (utc(2024, 1, 20, 10, 0, 0), "A", 50.0),
        (utc(2024, 3, 2, 10, 0, 0), "C", 500.0),
    ];
    let clock = Arc::new(SteppingClock::new(
        created[0].0,
        created.iter().skip(1).map(|(at, _, _)| *at),
    ));
    let state = PersistenceState::in_memory(clock);
    for (_, customer, total) in created {
        state
            .orders
            .create(order(customer, total, OrderStatus::completed()))
            .await
            .expect("create order");
    }
    state
}

fn summary(reports: &[CustomerReport]) -> Vec<(&str, f64, usize)> {
    reports
        .iter()
        .map(|report| (report.customer_id.as_str(), report.total, report.orders.len()))
        .collect()
}

#[rstest]
#[tokio::test]
async fn report_ranks_customers_by_spend() {
    let state = seeded_report_state().await;
    let january = ReportWindow::parse("2024-01-01", "2024-01-31").expect("valid window");

    let reports = state
        .orders
        .generate_report(january)
        .await
        .expect("generate report");

    assert_eq!(summary(&reports), vec![("B", 200.0, 1), ("A", 150.0, 2)]);
    let a_orders: Vec<f64> = reports
        .get(1)
        .map(|report| report.orders.iter().map(|order| order.total_price()).collect())
        .unwrap_or_default();
    assert_eq!(a_orders, vec![100.0, 50.0]);
}

#[rstest]
#[tokio::test]
async fn report_for_quiet_month_is_empty() {
    let state = seeded_report_state().await;
    let february = ReportWindow::parse("2024-02-01", "2024-02-29").expect("valid window");

    let reports = state
        .orders
        .generate_report(february)
        .await
        .expect("generate report");
    assert!(reports.is_empty());
}

#[rstest]
#[tokio::test]
async fn report_bounds_are_inclusive() {
    let state = seeded_report_state().await;
    let exact = ReportWindow::new(utc(2024, 1, 10, 10, 0, 0), utc(2024, 1, 20, 10, 0, 0))
        .expect("valid window");

    let reports = state.orders.generate_report(exact).await.expect("report");
    assert_eq!(summary(&reports), vec![("B", 200.0, 1), ("A", 50.0, 1)]);
}

#[rstest]
#[tokio::test]
async fn created_orders_read_back_unchanged(state: PersistenceState) {
    let draft = OrderDraft {
        customer_id: "customer-a".to_owned(),
        products: vec![
            ProductInOrder::new(product_id(), 2, 10.0),
            ProductInOrder::new(product_id(), 1, 5.5),
        ],
        total_price: 25.5,
        order_date: utc(2024, 1, 4, 18, 30, 0),
        status: OrderStatus::pending(),
    };
    let created = state.orders.create(draft.clone()).await.expect("create order");
    let fetched = state
        .orders
        .find_by_id(&created.id().to_string())
        .await
        .expect("find order");

    assert_eq!(fetched, created);
    assert_eq!(fetched.to_draft(), draft);
}

#[rstest]
#[tokio::test]
async fn status_filter_is_exact(state: PersistenceState) {
    for status in [
        OrderStatus::pending(),
        OrderStatus::completed(),
        OrderStatus::pending(),
        OrderStatus::cancelled(),
    ] {
        state
            .orders
            .create(order("customer-a", 10.0, status))
            .await
            .expect("create order");
    }
    let first_page = PageRequest::new(1, 10).expect("valid request");

    let pending = state
        .orders
        .find_all(first_page, "pending")
        .await
        .expect("list pending");
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|order| order.status() == &OrderStatus::pending()));
    assert_eq!(state.orders.count("pending").await.expect("count"), 2);
    assert_eq!(state.orders.count("Pending").await.expect("count"), 0);
    assert_eq!(state.orders.count("").await.expect("count"), 4);

    let page = state
        .orders
        .find_page(PageRequest::new(2, 3).expect("valid request"), "")
        .await
        .expect("find page");
    assert_eq!(page.items().len(), 1);
    assert_eq!(page.total(), 4);
    assert_eq!(page.total_pages(), 2);
}

#[rstest]
#[tokio::test]
async fn status_changes_bump_updated_at() {
    let created_at = utc(2024, 1, 5, 9, 0, 0);
    let clock = Arc::new(SteppingClock::new(created_at, [utc(2024, 1, 6, 9, 0, 0)]));
    let state = PersistenceState::in_memory(clock);
    let created = state
        .orders
        .create(order("customer-a", 10.0, OrderStatus::pending()))
        .await
        .expect("create order");

    let mut draft = created.to_draft();
    draft.status = OrderStatus::completed();
    let updated = state
        .orders
        .update(&created.id().to_string(), draft)
        .await
        .expect("update order");

    assert_eq!(updated.status(), &OrderStatus::completed());
    assert_eq!(updated.created_at(), created_at);
    assert_eq!(updated.updated_at(), utc(2024, 1, 6, 9, 0, 0));
}

#[rstest]
#[tokio::test]
async fn deleted_orders_are_not_found_everywhere(state: PersistenceState) {
    let created = state
        .orders
        .create(order("customer-a", 10.0, OrderStatus::pending()))
        .await
        .expect("create order");
    let id = created.id().to_string();
    state.orders.delete(&id).await.expect("first delete");

    let not_found = RepositoryError::not_found("order", id.as_str());
    assert_eq!(state.orders.find_by_id(&id).await, Err(not_found.clone()));
    assert_eq!(
        state.orders.update(&id, created.to_draft()).await,
        Err(not_found.clone())
    );
    assert_eq!(state.orders.delete(&id).await, Err(not_found));
}

#[rstest]
#[tokio::test]
async fn orders_without_line_items_are_rejected(state: PersistenceState) {
    let mut draft = order("customer-a", 0.0, OrderStatus::pending());
    draft.products.clear();

    let err = state.orders.create(draft).await.expect_err("empty order");
    assert!(matches!(err, RepositoryError::Validation { .. }));
    assert_eq!(state.orders.count("").await.expect("count"), 0);
}

#[rstest]
#[tokio::test]
async fn orders_written_by_other_clients_still_read_back() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let clock = Arc::new(FixtureClock::new(utc(2024, 1, 5, 9, 0, 0)));
    let state = PersistenceState::with_store(
        store.clone(),
        Arc::new(ObjectIdAllocator),
        clock,
        &StorefrontSettings::defaults(),
    );
    let stamp = bson::DateTime::from_millis(utc(2024, 1, 5, 9, 0, 0).timestamp_millis());
    let id = store
        .insert_one(
            DEFAULT_ORDERS_COLLECTION,
            doc! {
                "_id": ObjectId::new(),
                "customer_id": "legacy",
                "products": [
                    { "product_id": ObjectId::new(), "quantity": 1, "price": 3.0 }
                ],
                "total_price": 3.0,
                "order_date": stamp,
                "status": "pending ",
                "created_at": stamp,
                "updated_at": stamp,
            },
        )
        .await
        .expect("insert raw order");

    let listed = state
        .orders
        .find_all(PageRequest::new(1, 10).expect("valid request"), "")
        .await
        .expect("list orders");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed.first().map(|order| order.status().as_ref()), Some("pending "));

    let fetched = state
        .orders
        .find_by_id(&id.to_string())
        .await
        .expect("find order");
    assert_eq!(fetched.customer_id(), "legacy");

    let january = ReportWindow::parse("2024-01-01", "2024-01-31").expect("valid window");
    let reports = state.orders.generate_report(january).await.expect("report");
    assert_eq!(summary(&reports), vec![("legacy", 3.0, 1)]);
}
