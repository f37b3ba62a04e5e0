//! Storefront persistence library: catalogue and order repositories over a
//! document store, plus the customer spending report.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod reporting;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::StorefrontSettings;
pub use state::PersistenceState;
