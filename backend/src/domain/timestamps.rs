//! Audit timestamps carried by every persisted entity.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Validation errors returned by [`Timestamps::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampsError {
    UpdatedBeforeCreated {
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    },
}

impl fmt::Display for TimestampsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must not precede created_at ({created_at})"
            ),
        }
    }
}

impl std::error::Error for TimestampsError {}

/// Creation and last-update instants.
///
/// ## Invariants
/// - `updated_at >= created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamps {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Timestamps {
    /// Timestamps for an entity written for the first time at `now`.
    pub const fn stamped(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate a pair of timestamps read back from storage.
    pub fn new(
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, TimestampsError> {
        if updated_at < created_at {
            return Err(TimestampsError::UpdatedBeforeCreated {
                created_at,
                updated_at,
            });
        }
        Ok(Self {
            created_at,
            updated_at,
        })
    }

    /// Instant of the initial write.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Instant of the latest successful write.
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
