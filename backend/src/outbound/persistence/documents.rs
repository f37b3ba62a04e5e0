//! Stored document shapes for products and orders.
//!
//! Field names are the storage contract and stay snake_case regardless of
//! how the domain types serialise to JSON.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Bson, Document, doc};
use serde::Deserialize;

use crate::domain::{
    Identifier, Order, OrderDraft, OrderStatus, Product, ProductDraft, ProductInOrder, Timestamps,
};

use super::store::StoreError;

pub const ID: &str = "_id";
pub const NAME: &str = "name";
pub const CATEGORY: &str = "category";
pub const PRICE: &str = "price";
pub const STOCK: &str = "stock";
pub const CUSTOMER_ID: &str = "customer_id";
pub const PRODUCTS: &str = "products";
pub const PRODUCT_ID: &str = "product_id";
pub const QUANTITY: &str = "quantity";
pub const TOTAL_PRICE: &str = "total_price";
pub const ORDER_DATE: &str = "order_date";
pub const STATUS: &str = "status";
pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";

pub fn object_id(id: Identifier) -> ObjectId {
    ObjectId::from_bytes(id.bytes())
}

pub fn identifier(id: ObjectId) -> Identifier {
    Identifier::from_bytes(id.bytes())
}

/// Store date-times keep millisecond precision.
pub fn to_bson_datetime(instant: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(instant.timestamp_millis())
}

pub fn from_bson_datetime(instant: bson::DateTime) -> Result<DateTime<Utc>, StoreError> {
    let millis = instant.timestamp_millis();
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StoreError::decode(format!("date-time {millis}ms is out of range")))
}

/// Update-side fields of a product.
pub fn product_fields(draft: &ProductDraft) -> Document {
    doc! {
        NAME: draft.name.as_str(),
        CATEGORY: draft.category.as_str(),
        PRICE: draft.price,
        STOCK: i64::from(draft.stock),
    }
}

/// Full product document for insertion.
pub fn product_document(id: Identifier, draft: &ProductDraft, stamps: Timestamps) -> Document {
    let mut document = doc! { ID: object_id(id) };
    for (key, value) in product_fields(draft) {
        document.insert(key, value);
    }
    document.insert(CREATED_AT, to_bson_datetime(stamps.created_at()));
    document.insert(UPDATED_AT, to_bson_datetime(stamps.updated_at()));
    document
}

/// Update-side fields of an order.
pub fn order_fields(draft: &OrderDraft) -> Document {
    let products: Vec<Bson> = draft
        .products
        .iter()
        .map(|item| {
            Bson::Document(doc! {
                PRODUCT_ID: object_id(item.product_id),
                QUANTITY: i64::from(item.quantity),
                PRICE: item.unit_price,
            })
        })
        .collect();
    doc! {
        CUSTOMER_ID: draft.customer_id.as_str(),
        PRODUCTS: products,
        TOTAL_PRICE: draft.total_price,
        ORDER_DATE: to_bson_datetime(draft.order_date),
        STATUS: draft.status.as_ref(),
    }
}

/// Full order document for insertion.
pub fn order_document(id: Identifier, draft: &OrderDraft, stamps: Timestamps) -> Document {
    let mut document = doc! { ID: object_id(id) };
    for (key, value) in order_fields(draft) {
        document.insert(key, value);
    }
    document.insert(CREATED_AT, to_bson_datetime(stamps.created_at()));
    document.insert(UPDATED_AT, to_bson_datetime(stamps.updated_at()));
    document
}

#[derive(Debug, Deserialize)]
pub struct ProductDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    category: String,
    price: f64,
    stock: u32,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl ProductDocument {
    pub fn decode(document: Document) -> Result<Product, StoreError> {
        let stored: Self = bson::from_document(document)
            .map_err(|err| StoreError::decode(format!("product document: {err}")))?;
        let stamps = timestamps(stored.created_at, stored.updated_at)?;
        Ok(Product::new(
            identifier(stored.id),
            ProductDraft::new(stored.name, stored.category, stored.price, stored.stock),
            stamps,
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct LineItemDocument {
    product_id: ObjectId,
    quantity: u32,
    price: f64,
}

#[derive(Debug, Deserialize)]
pub struct OrderDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    customer_id: String,
    products: Vec<LineItemDocument>,
    total_price: f64,
    order_date: bson::DateTime,
    status: String,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl OrderDocument {
    pub fn decode(document: Document) -> Result<Order, StoreError> {
        let stored: Self = bson::from_document(document)
            .map_err(|err| StoreError::decode(format!("order document: {err}")))?;
        stored.into_order()
    }

    pub fn into_order(self) -> Result<Order, StoreError> {
        let stamps = timestamps(self.created_at, self.updated_at)?;
        let status = OrderStatus::from_stored(self.status);
        let draft = OrderDraft {
            customer_id: self.customer_id,
            products: self
                .products
                .into_iter()
                .map(|item| {
                    ProductInOrder::new(identifier(item.product_id), item.quantity, item.price)
                })
                .collect(),
            total_price: self.total_price,
            order_date: from_bson_datetime(self.order_date)?,
            status,
        };
        Ok(Order::new(identifier(self.id), draft, stamps))
    }
}

fn timestamps(
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
) -> Result<Timestamps, StoreError> {
    Timestamps::new(from_bson_datetime(created_at)?, from_bson_datetime(updated_at)?)
        .map_err(|err| StoreError::decode(err.to_string()))
}
