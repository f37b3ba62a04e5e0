//! Aggregation pipelines built from typed stages.

use mongodb::bson::{Bson, Document, doc};

use crate::domain::{Filter, ReportWindow};

use super::documents::{CUSTOMER_ID, ID, TOTAL_PRICE};
use super::query_translation::filter_to_document;

/// Output field holding the summed order totals of a report row.
pub const REPORT_TOTAL: &str = "total";
/// Output field holding the full order documents of a report row.
pub const REPORT_ORDERS: &str = "orders";
/// Output field holding the smallest order identifier of a report row.
pub const REPORT_FIRST_ORDER: &str = "first_order";

/// Per-group accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accumulator {
    /// Numeric sum of a field.
    Sum(&'static str),
    /// Smallest value of a field.
    Min(&'static str),
    /// Every input document, in encounter order.
    PushRoot,
}

impl Accumulator {
    fn to_bson(&self) -> Bson {
        match self {
            Self::Sum(field) => Bson::Document(doc! { "$sum": format!("${field}") }),
            Self::Min(field) => Bson::Document(doc! { "$min": format!("${field}") }),
            Self::PushRoot => Bson::Document(doc! { "$push": "$$ROOT" }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    const fn direction(self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

/// One pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Keep documents satisfying the filter.
    Match(Filter),
    /// Group by `key`; each output row has `_id` set to the key value and
    /// one field per named accumulator.
    Group {
        key: &'static str,
        accumulators: Vec<(&'static str, Accumulator)>,
    },
    /// Order rows by the listed fields, most significant first.
    Sort(Vec<(&'static str, SortOrder)>),
}

impl Stage {
    fn to_document(&self) -> Document {
        match self {
            Self::Match(filter) => doc! { "$match": filter_to_document(filter) },
            Self::Group { key, accumulators } => {
                let mut group = doc! { ID: format!("${key}") };
                for (name, accumulator) in accumulators {
                    group.insert(*name, accumulator.to_bson());
                }
                doc! { "$group": group }
            }
            Self::Sort(keys) => {
                let mut sort = Document::new();
                for (field, order) in keys {
                    sort.insert(*field, order.direction());
                }
                doc! { "$sort": sort }
            }
        }
    }
}

/// Ordered list of stages.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// MongoDB pipeline documents.
    pub fn to_documents(&self) -> Vec<Document> {
        self.stages.iter().map(Stage::to_document).collect()
    }
}

/// Orders created inside `window`, grouped by customer and ranked by spend.
///
/// Customers with equal totals are ordered by their earliest order
/// identifier, which preserves creation order.
pub fn customer_spend_report(window: &ReportWindow) -> Pipeline {
    Pipeline::new(vec![
        Stage::Match(Filter::by_date_range(window)),
        Stage::Group {
            key: CUSTOMER_ID,
            accumulators: vec![
                (REPORT_TOTAL, Accumulator::Sum(TOTAL_PRICE)),
                (REPORT_ORDERS, Accumulator::PushRoot),
                (REPORT_FIRST_ORDER, Accumulator::Min(ID)),
            ],
        },
        Stage::Sort(vec![
            (REPORT_TOTAL, SortOrder::Descending),
            (REPORT_FIRST_ORDER, SortOrder::Ascending),
        ]),
    ])
}
