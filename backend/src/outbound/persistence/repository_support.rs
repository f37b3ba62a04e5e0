//! Helpers shared by the document-backed repositories.

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::debug;

use crate::domain::Identifier;
use crate::domain::ports::RepositoryError;

use super::store::StoreError;

/// Parse caller-supplied identifier text, rejecting it before any store access.
pub fn parse_identifier(id: &str) -> Result<Identifier, RepositoryError> {
    Identifier::parse(id).map_err(|err| {
        debug!(id, error = %err, "rejected malformed identifier");
        RepositoryError::invalid_id(id)
    })
}

/// Current instant truncated to the store's millisecond precision.
pub fn current_time(clock: &dyn Clock) -> DateTime<Utc> {
    let now = clock.utc();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

pub fn map_store_error(error: StoreError) -> RepositoryError {
    RepositoryError::store(error.to_string())
}

pub fn map_aggregation_error(error: StoreError) -> RepositoryError {
    RepositoryError::aggregation(error.to_string())
}
