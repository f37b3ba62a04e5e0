//! Port for minting new entity identifiers.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::domain::Identifier;

/// Source of fresh, globally unique identifiers.
///
/// Allocation cannot fail.
#[cfg_attr(test, mockall::automock)]
pub trait IdentifierAllocator: Send + Sync {
    /// Produce an identifier that has never been handed out before.
    fn allocate(&self) -> Identifier;
}

/// Deterministic allocator for tests: a fixed timestamp prefix followed by
/// an incrementing counter.
#[derive(Debug, Default)]
pub struct FixtureIdentifierAllocator {
    seconds: u32,
    next: AtomicU32,
}

impl FixtureIdentifierAllocator {
    /// Allocator whose identifiers all embed `seconds` as their creation time.
    pub const fn starting_at(seconds: u32) -> Self {
        Self {
            seconds,
            next: AtomicU32::new(0),
        }
    }
}

impl IdentifierAllocator for FixtureIdentifierAllocator {
    fn allocate(&self) -> Identifier {
        let counter = self.next.fetch_add(1, Ordering::Relaxed);
        let [a, b, c, d] = self.seconds.to_be_bytes();
        let [e, f, g, h] = counter.to_be_bytes();
        Identifier::from_bytes([a, b, c, d, 0, 0, 0, 0, e, f, g, h])
    }
}
