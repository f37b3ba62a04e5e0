//! Catalogue product model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Identifier, Timestamps};

/// Validation errors returned by [`ProductDraft::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductValidationError {
    EmptyName,
    InvalidPrice,
}

impl fmt::Display for ProductValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "product name must not be empty"),
            Self::InvalidPrice => write!(f, "product price must be a finite, non-negative number"),
        }
    }
}

impl std::error::Error for ProductValidationError {}

/// Caller-supplied product fields, used for both create and full update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub stock: u32,
}

impl ProductDraft {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: f64, stock: u32) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            price,
            stock,
        }
    }

    /// Check the draft before it reaches the store.
    pub fn validate(&self) -> Result<(), ProductValidationError> {
        if self.name.trim().is_empty() {
            return Err(ProductValidationError::EmptyName);
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ProductValidationError::InvalidPrice);
        }
        Ok(())
    }
}

/// Persisted catalogue product.
///
/// ## Invariants
/// - `id` is assigned once at creation and never changes.
/// - `created_at <= updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: Identifier,
    name: String,
    category: String,
    price: f64,
    stock: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    /// Assemble a product from its identifier, fields and audit timestamps.
    pub fn new(id: Identifier, draft: ProductDraft, timestamps: Timestamps) -> Self {
        let ProductDraft {
            name,
            category,
            price,
            stock,
        } = draft;
        Self {
            id,
            name,
            category,
            price,
            stock,
            created_at: timestamps.created_at(),
            updated_at: timestamps.updated_at(),
        }
    }

    pub fn id(&self) -> Identifier {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn category(&self) -> &str {
        self.category.as_str()
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Mutable fields as a draft, e.g. to apply a partial change before update.
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft::new(self.name.clone(), self.category.clone(), self.price, self.stock)
    }
}
