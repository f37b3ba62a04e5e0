//! Customer order model.
//!
//! Line items are value copies taken at order time: the product identifier
//! and unit price are not live links to the catalogue, so later product
//! edits never rewrite historical orders.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Identifier, Timestamps};

/// Absolute tolerance used when comparing an order total with its line items.
const TOTAL_TOLERANCE: f64 = 1e-6;

/// Validation errors raised for order drafts and statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderValidationError {
    EmptyCustomerId,
    NoLineItems,
    ZeroQuantity { line: usize },
    InvalidUnitPrice { line: usize },
    InvalidTotalPrice,
    EmptyStatus,
    UntrimmedStatus,
}

impl fmt::Display for OrderValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCustomerId => write!(f, "customer id must not be empty"),
            Self::NoLineItems => write!(f, "order must contain at least one product"),
            Self::ZeroQuantity { line } => {
                write!(f, "line item {line} must have a positive quantity")
            }
            Self::InvalidUnitPrice { line } => write!(
                f,
                "line item {line} must have a finite, non-negative unit price"
            ),
            Self::InvalidTotalPrice => {
                write!(f, "total price must be a finite, non-negative number")
            }
            Self::EmptyStatus => write!(f, "order status must not be empty"),
            Self::UntrimmedStatus => {
                write!(f, "order status must not have surrounding whitespace")
            }
        }
    }
}

impl std::error::Error for OrderValidationError {}

/// Order status drawn from an open set of labels.
///
/// Well-known values are `pending`, `completed` and `cancelled`; any other
/// non-empty, trimmed label is accepted and stored verbatim. Labels are
/// case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderStatus(String);

impl OrderStatus {
    /// Order placed but not yet fulfilled.
    pub const PENDING: &'static str = "pending";
    /// Order fulfilled.
    pub const COMPLETED: &'static str = "completed";
    /// Order withdrawn before fulfilment.
    pub const CANCELLED: &'static str = "cancelled";

    /// Validate and construct a status label.
    pub fn new(status: impl Into<String>) -> Result<Self, OrderValidationError> {
        let status = status.into();
        if status.trim().is_empty() {
            return Err(OrderValidationError::EmptyStatus);
        }
        if status.trim() != status {
            return Err(OrderValidationError::UntrimmedStatus);
        }
        Ok(Self(status))
    }

    /// Wrap a label read back from storage without re-validating it.
    ///
    /// Documents written by other clients may carry labels that
    /// [`OrderStatus::new`] would reject; reads must still return them.
    pub fn from_stored(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn pending() -> Self {
        Self(Self::PENDING.to_owned())
    }

    pub fn completed() -> Self {
        Self(Self::COMPLETED.to_owned())
    }

    pub fn cancelled() -> Self {
        Self(Self::CANCELLED.to_owned())
    }
}

impl AsRef<str> for OrderStatus {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<OrderStatus> for String {
    fn from(value: OrderStatus) -> Self {
        value.0
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = OrderValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Product line captured on an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductInOrder {
    pub product_id: Identifier,
    pub quantity: u32,
    pub unit_price: f64,
}

impl ProductInOrder {
    pub fn new(product_id: Identifier, quantity: u32, unit_price: f64) -> Self {
        Self {
            product_id,
            quantity,
            unit_price,
        }
    }

    /// `quantity × unit price`.
    pub fn subtotal(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }
}

/// Caller-supplied order fields, used for both create and full update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderDraft {
    pub customer_id: String,
    pub products: Vec<ProductInOrder>,
    pub total_price: f64,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
}

impl OrderDraft {
    /// Check the draft before it reaches the store.
    ///
    /// The total is checked for shape only; agreement with the line items is
    /// reported by [`OrderDraft::total_matches_line_items`] and left to callers.
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        if self.customer_id.trim().is_empty() {
            return Err(OrderValidationError::EmptyCustomerId);
        }
        if self.products.is_empty() {
            return Err(OrderValidationError::NoLineItems);
        }
        for (line, item) in self.products.iter().enumerate() {
            if item.quantity == 0 {
                return Err(OrderValidationError::ZeroQuantity { line });
            }
            if !item.unit_price.is_finite() || item.unit_price < 0.0 {
                return Err(OrderValidationError::InvalidUnitPrice { line });
            }
        }
        if !self.total_price.is_finite() || self.total_price < 0.0 {
            return Err(OrderValidationError::InvalidTotalPrice);
        }
        Ok(())
    }

    /// Sum of line item subtotals.
    pub fn line_items_total(&self) -> f64 {
        self.products.iter().map(ProductInOrder::subtotal).sum()
    }

    /// Whether `total_price` agrees with the line items.
    pub fn total_matches_line_items(&self) -> bool {
        (self.total_price - self.line_items_total()).abs() <= TOTAL_TOLERANCE
    }
}

/// Persisted customer order.
///
/// ## Invariants
/// - `id` is assigned once at creation and never changes.
/// - `created_at <= updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: Identifier,
    customer_id: String,
    products: Vec<ProductInOrder>,
    total_price: f64,
    order_date: DateTime<Utc>,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Assemble an order from its identifier, fields and audit timestamps.
    pub fn new(id: Identifier, draft: OrderDraft, timestamps: Timestamps) -> Self {
        let OrderDraft {
            customer_id,
            products,
            total_price,
            order_date,
            status,
        } = draft;
        Self {
            id,
            customer_id,
            products,
            total_price,
            order_date,
            status,
            created_at: timestamps.created_at(),
            updated_at: timestamps.updated_at(),
        }
    }

    pub fn id(&self) -> Identifier {
        self.id
    }

    pub fn customer_id(&self) -> &str {
        self.customer_id.as_str()
    }

    pub fn products(&self) -> &[ProductInOrder] {
        &self.products
    }

    pub fn total_price(&self) -> f64 {
        self.total_price
    }

    pub fn order_date(&self) -> DateTime<Utc> {
        self.order_date
    }

    pub fn status(&self) -> &OrderStatus {
        &self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Mutable fields as a draft, e.g. to change the status before update.
    pub fn to_draft(&self) -> OrderDraft {
        OrderDraft {
            customer_id: self.customer_id.clone(),
            products: self.products.clone(),
            total_price: self.total_price,
            order_date: self.order_date,
            status: self.status.clone(),
        }
    }
}
