//! Domain primitives and aggregates.
//!
//! Purpose: Define the strongly typed catalogue and order entities used by
//! the repositories, plus the query and report types they accept. Keep types
//! immutable and document invariants and serialisation contracts (serde) in
//! each type's Rustdoc.
//!
//! Public surface:
//! - Identifier: opaque, creation-time sortable entity identifier.
//! - Product / ProductDraft: catalogue entries and their editable fields.
//! - Order / OrderDraft / ProductInOrder / OrderStatus: customer orders.
//! - Filter and the `build_*` helpers: typed query construction.
//! - ReportWindow / CustomerReport: spending report input and output.

pub mod identifier;
pub mod order;
pub mod ports;
pub mod product;
pub mod query;
pub mod report;
pub mod timestamps;

pub use self::identifier::{Identifier, IdentifierError};
pub use self::order::{Order, OrderDraft, OrderStatus, OrderValidationError, ProductInOrder};
pub use self::product::{Product, ProductDraft, ProductValidationError};
pub use self::query::{Filter, build_page, build_search_filter, build_status_filter};
pub use self::report::{CustomerReport, ReportWindow, ReportWindowError};
pub use self::timestamps::{Timestamps, TimestampsError};
