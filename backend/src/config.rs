//! Storefront persistence configuration loaded via OrthoConfig.

use std::time::Duration;

use ortho_config::OrthoConfig;
use pagination::DEFAULT_MAX_PAGE_SIZE;
use serde::Deserialize;

use crate::outbound::persistence::{
    DEFAULT_ORDERS_COLLECTION, DEFAULT_PRODUCTS_COLLECTION, StoreConfig,
};

const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";
const DEFAULT_DATABASE: &str = "storefront";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 20;

/// Settings for the document store and repositories.
///
/// Unset string fields fall back to their defaults in the accessors.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "STOREFRONT")]
pub struct StorefrontSettings {
    /// MongoDB connection string.
    pub mongodb_uri: Option<String>,
    /// Database holding the product and order collections.
    pub database: Option<String>,
    /// Collection name for products.
    pub products_collection: Option<String>,
    /// Collection name for orders.
    pub orders_collection: Option<String>,
    /// Ceiling applied to every requested page size.
    #[ortho_config(default = 100)]
    pub max_page_size: u32,
    /// Seconds allowed for the initial connection and server selection.
    #[ortho_config(default = 20)]
    pub connect_timeout_secs: u64,
}

impl StorefrontSettings {
    /// Settings holding every default value.
    pub const fn defaults() -> Self {
        Self {
            mongodb_uri: None,
            database: None,
            products_collection: None,
            orders_collection: None,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }

    pub fn mongodb_uri(&self) -> &str {
        self.mongodb_uri.as_deref().unwrap_or(DEFAULT_MONGODB_URI)
    }

    pub fn database(&self) -> &str {
        self.database.as_deref().unwrap_or(DEFAULT_DATABASE)
    }

    pub fn products_collection(&self) -> &str {
        self.products_collection
            .as_deref()
            .unwrap_or(DEFAULT_PRODUCTS_COLLECTION)
    }

    pub fn orders_collection(&self) -> &str {
        self.orders_collection
            .as_deref()
            .unwrap_or(DEFAULT_ORDERS_COLLECTION)
    }

    /// Configured page size ceiling, raised to at least one.
    pub fn max_page_size(&self) -> u32 {
        self.max_page_size.max(1)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Connection parameters for the MongoDB store adapter.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.mongodb_uri())
            .with_database(self.database())
            .with_connect_timeout(self.connect_timeout())
    }
}
