//! Identifier allocator backed by the BSON ObjectId generator.

use mongodb::bson::oid::ObjectId;

use crate::domain::Identifier;
use crate::domain::ports::IdentifierAllocator;

use super::documents::identifier;

/// Allocates identifiers with the driver's process-wide ObjectId generator:
/// current seconds, a per-process random value and an incrementing counter.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectIdAllocator;

impl IdentifierAllocator for ObjectIdAllocator {
    fn allocate(&self) -> Identifier {
        identifier(ObjectId::new())
    }
}
