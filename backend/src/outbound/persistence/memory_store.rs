//! Process-local document store.
//!
//! Evaluates the same filter, update and pipeline language as the MongoDB
//! adapter. Documents are kept in insertion order per collection; `find`
//! returns them in ascending `_id` order like the MongoDB adapter.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use pagination::PageWindow;
use tracing::debug;

use crate::domain::{Filter, Identifier};

use super::documents::{ID, identifier};
use super::pipeline::{Accumulator, Pipeline, SortOrder, Stage};
use super::query_translation::{as_number, compare_values, document_matches};
use super::store::{DocumentStore, DocumentUpdate, StoreError};

type Collections = HashMap<String, Vec<Document>>;

/// In-memory [`DocumentStore`] guarded by a mutex.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: Mutex<Collections>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, StoreError> {
        self.collections
            .lock()
            .map_err(|_| StoreError::connection("in-memory store lock poisoned"))
    }

    fn snapshot(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| document_matches(filter, document))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<Identifier, StoreError> {
        let id = document
            .get_object_id(ID)
            .map_err(|_| StoreError::query("document is missing an object id"))?;
        let mut guard = self.lock()?;
        let documents = guard.entry(collection.to_owned()).or_default();
        if documents
            .iter()
            .any(|stored| stored.get_object_id(ID).is_ok_and(|existing| existing == id))
        {
            return Err(StoreError::query(format!(
                "duplicate key {id} in collection {collection}"
            )));
        }
        documents.push(document);
        Ok(identifier(id))
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.get(collection).and_then(|documents| {
            documents
                .iter()
                .find(|document| document_matches(filter, document))
                .cloned()
        }))
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        window: PageWindow,
    ) -> Result<Vec<Document>, StoreError> {
        let skip = usize::try_from(window.skip()).unwrap_or(usize::MAX);
        let take = usize::try_from(window.take()).unwrap_or(usize::MAX);
        let mut matches = self.snapshot(collection, filter)?;
        matches.sort_by(|left, right| match (left.get(ID), right.get(ID)) {
            (Some(a), Some(b)) => compare_values(a, b).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        });
        Ok(matches
            .into_iter()
            .skip(skip)
            .take(take)
            .collect())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &DocumentUpdate,
    ) -> Result<Option<Document>, StoreError> {
        let mut guard = self.lock()?;
        let Some(document) = guard.get_mut(collection).and_then(|documents| {
            documents
                .iter_mut()
                .find(|document| document_matches(filter, document))
        }) else {
            return Ok(None);
        };

        for (field, value) in update.set() {
            document.insert(field.clone(), value.clone());
        }
        for (field, value) in update.raise() {
            let raise = document
                .get(field)
                .is_none_or(|current| compare_values(value, current) == Some(Ordering::Greater));
            if raise {
                document.insert(field.clone(), value.clone());
            }
        }
        Ok(Some(document.clone()))
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut guard = self.lock()?;
        let Some(documents) = guard.get_mut(collection) else {
            return Ok(0);
        };
        match documents
            .iter()
            .position(|document| document_matches(filter, document))
        {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let guard = self.lock()?;
        let matches = guard.get(collection).map_or(0, |documents| {
            documents
                .iter()
                .filter(|document| document_matches(filter, document))
                .count()
        });
        Ok(u64::try_from(matches).unwrap_or(u64::MAX))
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<Vec<Document>, StoreError> {
        let mut rows = self.snapshot(collection, &Filter::All)?;
        for stage in pipeline.stages() {
            rows = apply_stage(stage, rows)?;
            debug!(collection, rows = rows.len(), "in-memory pipeline stage applied");
        }
        Ok(rows)
    }
}

fn apply_stage(stage: &Stage, rows: Vec<Document>) -> Result<Vec<Document>, StoreError> {
    match stage {
        Stage::Match(filter) => Ok(rows
            .into_iter()
            .filter(|row| document_matches(filter, row))
            .collect()),
        Stage::Group { key, accumulators } => group(key, accumulators, rows),
        Stage::Sort(keys) => {
            let mut sorted = rows;
            sorted.sort_by(|left, right| compare_rows(keys, left, right));
            Ok(sorted)
        }
    }
}

fn group(
    key: &str,
    accumulators: &[(&'static str, Accumulator)],
    rows: Vec<Document>,
) -> Result<Vec<Document>, StoreError> {
    let mut groups: Vec<(Bson, Document)> = Vec::new();
    for row in rows {
        let value = row.get(key).cloned().unwrap_or(Bson::Null);
        let position = match groups.iter().position(|(existing, _)| *existing == value) {
            Some(position) => position,
            None => {
                let mut output = Document::new();
                output.insert(ID, value.clone());
                groups.push((value, output));
                groups.len() - 1
            }
        };
        let Some((_, output)) = groups.get_mut(position) else {
            return Err(StoreError::query("group index out of range"));
        };
        for (name, accumulator) in accumulators {
            accumulate(output, name, accumulator, &row)?;
        }
    }
    Ok(groups.into_iter().map(|(_, output)| output).collect())
}

fn accumulate(
    output: &mut Document,
    name: &str,
    accumulator: &Accumulator,
    row: &Document,
) -> Result<(), StoreError> {
    match accumulator {
        Accumulator::Sum(field) => {
            let addend = row.get(*field).and_then(as_number).unwrap_or(0.0);
            let running = output.get(name).and_then(as_number).unwrap_or(0.0);
            output.insert(name, running + addend);
        }
        Accumulator::Min(field) => {
            if let Some(candidate) = row.get(*field) {
                let replace = output.get(name).is_none_or(|current| {
                    compare_values(candidate, current) == Some(Ordering::Less)
                });
                if replace {
                    output.insert(name, candidate.clone());
                }
            }
        }
        Accumulator::PushRoot => {
            let entry = output
                .entry(name.to_owned())
                .or_insert_with(|| Bson::Array(Vec::new()));
            let Bson::Array(items) = entry else {
                return Err(StoreError::query(format!("group field {name} is not an array")));
            };
            items.push(Bson::Document(row.clone()));
        }
    }
    Ok(())
}

fn compare_rows(keys: &[(&'static str, SortOrder)], left: &Document, right: &Document) -> Ordering {
    for (field, order) in keys {
        let ordering = match (left.get(*field), right.get(*field)) {
            (Some(a), Some(b)) => compare_values(a, b).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        let ordering = match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;
    use mongodb::bson::{DateTime, doc};
    use pagination::PageRequest;
    use rstest::{fixture, rstest};

    use crate::domain::ReportWindow;
    use crate::outbound::persistence::pipeline::customer_spend_report;

    const ORDERS: &str = "orders";

    fn oid(counter: u8) -> ObjectId {
        ObjectId::from_bytes([0x65, 0x90, 0, 0, 0, 0, 0, 0, 0, 0, 0, counter])
    }

    fn order(counter: u8, customer: &str, total: f64, created_millis: i64) -> Document {
        doc! {
            "_id": oid(counter),
            "customer_id": customer,
            "total_price": total,
            "created_at": DateTime::from_millis(created_millis),
        }
    }

    #[fixture]
    fn store() -> InMemoryDocumentStore {
        InMemoryDocumentStore::new()
    }

    #[rstest]
    #[tokio::test]
    async fn find_pages_in_ascending_id_order(store: InMemoryDocumentStore) {
        for counter in [7, 2, 9, 4] {
            store
                .insert_one(ORDERS, order(counter, "a", 1.0, 0))
                .await
                .expect("insert");
        }
        let first = PageRequest::new(1, 3).expect("valid request").window();
        let second = PageRequest::new(2, 3).expect("valid request").window();

        let ids = |documents: Vec<Document>| -> Vec<ObjectId> {
            documents
                .iter()
                .filter_map(|document| document.get_object_id(ID).ok())
                .collect()
        };
        let page_one = store.find(ORDERS, &Filter::All, first).await.expect("find");
        let page_two = store.find(ORDERS, &Filter::All, second).await.expect("find");
        assert_eq!(ids(page_one), vec![oid(2), oid(4), oid(7)]);
        assert_eq!(ids(page_two), vec![oid(9)]);
    }

    #[rstest]
    #[tokio::test]
    async fn insert_rejects_duplicate_ids(store: InMemoryDocumentStore) {
        store
            .insert_one(ORDERS, order(1, "a", 1.0, 0))
            .await
            .expect("first insert");
        let err = store
            .insert_one(ORDERS, order(1, "a", 1.0, 0))
            .await
            .expect_err("duplicate insert");
        assert!(err.to_string().contains("duplicate key"));
    }

    #[rstest]
    #[tokio::test]
    async fn max_never_lowers_a_field(store: InMemoryDocumentStore) {
        store
            .insert_one(ORDERS, order(1, "a", 1.0, 5_000))
            .await
            .expect("insert");
        let id = Identifier::from_bytes(oid(1).bytes());
        let update = DocumentUpdate::new(
            doc! { "customer_id": "b" },
            doc! { "created_at": DateTime::from_millis(1_000) },
        );
        let updated = store
            .update_one(ORDERS, &Filter::IdEquals(id), &update)
            .await
            .expect("update")
            .expect("document exists");
        assert_eq!(updated.get_str("customer_id").expect("customer"), "b");
        assert_eq!(
            updated.get_datetime("created_at").expect("created").timestamp_millis(),
            5_000
        );
    }

    #[rstest]
    #[tokio::test]
    async fn find_applies_window_in_insertion_order(store: InMemoryDocumentStore) {
        for counter in 1..=5 {
            store
                .insert_one(ORDERS, order(counter, "a", 1.0, 0))
                .await
                .expect("insert");
        }
        let window = pagination::PageRequest::new(2, 2).expect("valid request").window();
        let page = store
            .find(ORDERS, &Filter::All, window)
            .await
            .expect("find");
        let ids: Vec<ObjectId> = page
            .iter()
            .map(|document| document.get_object_id("_id").expect("id"))
            .collect();
        assert_eq!(ids, vec![oid(3), oid(4)]);
    }

    #[rstest]
    #[tokio::test]
    async fn report_pipeline_groups_and_ranks(store: InMemoryDocumentStore) {
        let window = ReportWindow::parse("1970-01-01", "1970-01-01").expect("valid window");
        for document in [
            order(1, "a", 50.0, 10),
            order(2, "b", 200.0, 20),
            order(3, "a", 100.0, 30),
            order(4, "c", 200.0, 40),
            order(5, "d", 999.0, 86_400_000),
        ] {
            store.insert_one(ORDERS, document).await.expect("insert");
        }

        let rows = store
            .aggregate(ORDERS, &customer_spend_report(&window))
            .await
            .expect("aggregate");
        let summary: Vec<(&str, f64, usize)> = rows
            .iter()
            .map(|row| {
                (
                    row.get_str("_id").expect("customer"),
                    row.get_f64("total").expect("total"),
                    row.get_array("orders").expect("orders").len(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![("b", 200.0, 1), ("c", 200.0, 1), ("a", 150.0, 2)]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn delete_reports_removed_count(store: InMemoryDocumentStore) {
        store
            .insert_one(ORDERS, order(1, "a", 1.0, 0))
            .await
            .expect("insert");
        let filter = Filter::IdEquals(Identifier::from_bytes(oid(1).bytes()));
        assert_eq!(store.delete_one(ORDERS, &filter).await.expect("delete"), 1);
        assert_eq!(store.delete_one(ORDERS, &filter).await.expect("delete"), 0);
        assert_eq!(store.count(ORDERS, &Filter::All).await.expect("count"), 0);
    }
}
