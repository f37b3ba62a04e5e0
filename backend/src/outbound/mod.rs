//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern:
//!
//! - **persistence**: document-store repositories (MongoDB and in-memory)
//!   and the ObjectId-backed identifier allocator
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod persistence;
