//! Translation of typed filters into MongoDB query documents, plus a direct
//! evaluator with the same semantics for the in-memory store.

use std::cmp::Ordering;

use mongodb::bson::{Bson, Document, doc};
use regex::RegexBuilder;

use crate::domain::Filter;

use super::documents::{CREATED_AT, ID, NAME, STATUS, object_id, to_bson_datetime};

/// MongoDB query document for `filter`.
///
/// Search terms are escaped so regex metacharacters match literally.
pub fn filter_to_document(filter: &Filter) -> Document {
    match filter {
        Filter::All => doc! {},
        Filter::IdEquals(id) => doc! { ID: object_id(*id) },
        Filter::NameContains(term) => doc! {
            NAME: { "$regex": regex::escape(term), "$options": "i" },
        },
        Filter::StatusEquals(status) => doc! { STATUS: status.as_str() },
        Filter::CreatedBetween { start, end } => doc! {
            CREATED_AT: {
                "$gte": to_bson_datetime(*start),
                "$lte": to_bson_datetime(*end),
            },
        },
    }
}

/// Whether `document` satisfies `filter`.
pub fn document_matches(filter: &Filter, document: &Document) -> bool {
    match filter {
        Filter::All => true,
        Filter::IdEquals(id) => document
            .get_object_id(ID)
            .is_ok_and(|stored| stored == object_id(*id)),
        Filter::NameContains(term) => {
            let Ok(pattern) = RegexBuilder::new(&regex::escape(term))
                .case_insensitive(true)
                .build()
            else {
                return false;
            };
            document
                .get_str(NAME)
                .is_ok_and(|name| pattern.is_match(name))
        }
        Filter::StatusEquals(status) => document
            .get_str(STATUS)
            .is_ok_and(|stored| stored == status),
        Filter::CreatedBetween { start, end } => {
            document.get_datetime(CREATED_AT).is_ok_and(|created| {
                let created = created.timestamp_millis();
                to_bson_datetime(*start).timestamp_millis() <= created
                    && created <= to_bson_datetime(*end).timestamp_millis()
            })
        }
    }
}

/// Ordering between two scalar BSON values of comparable types.
///
/// Numbers compare across integer and double representations. Values of
/// unrelated types yield `None`.
pub fn compare_values(left: &Bson, right: &Bson) -> Option<Ordering> {
    match (left, right) {
        (Bson::String(a), Bson::String(b)) => Some(a.cmp(b)),
        (Bson::DateTime(a), Bson::DateTime(b)) => Some(a.cmp(b)),
        (Bson::ObjectId(a), Bson::ObjectId(b)) => Some(a.cmp(b)),
        _ => as_number(left)?.partial_cmp(&as_number(right)?),
    }
}

/// Numeric value of an integer or double BSON value.
pub fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(number) => Some(*number),
        Bson::Int32(number) => Some(f64::from(*number)),
        Bson::Int64(number) => Some(*number as f64),
        _ => None,
    }
}
