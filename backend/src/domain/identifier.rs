//! Opaque entity identifier.
//!
//! Identifiers are twelve bytes: a big-endian creation timestamp in seconds,
//! five random bytes, and a three-byte counter. Callers only ever see the
//! 24-character lowercase hex form; the byte layout is exposed solely so the
//! persistence adapter can convert to and from the store's native type.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ID_BYTES: usize = 12;

/// Validation errors returned by [`Identifier::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    Empty,
    InvalidLength { length: usize },
    InvalidCharacters,
}

impl fmt::Display for IdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "identifier must not be empty"),
            Self::InvalidLength { length } => write!(
                f,
                "identifier must be {} hex characters, got {length} bytes",
                Identifier::TEXT_LEN
            ),
            Self::InvalidCharacters => write!(f, "identifier must contain only hex digits"),
        }
    }
}

impl std::error::Error for IdentifierError {}

/// Globally unique, creation-time sortable entity identifier.
///
/// ## Invariants
/// - The text form is always 24 lowercase hex characters.
/// - Ordering follows the byte layout, so identifiers allocated in later
///   seconds sort after earlier ones.
///
/// # Examples
/// ```
/// use storefront::domain::Identifier;
///
/// let id = Identifier::parse("65a1b2c3d4e5f60718293a4b").expect("valid id");
/// assert_eq!(id.to_string(), "65a1b2c3d4e5f60718293a4b");
/// assert_eq!(id.timestamp().timestamp(), 0x65a1_b2c3);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier([u8; ID_BYTES]);

impl Identifier {
    /// Number of raw bytes in an identifier.
    pub const BYTE_LEN: usize = ID_BYTES;
    /// Number of characters in the text form.
    pub const TEXT_LEN: usize = Self::BYTE_LEN * 2;

    /// Build an identifier from its raw bytes.
    pub const fn from_bytes(bytes: [u8; Self::BYTE_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes of the identifier.
    pub const fn bytes(&self) -> [u8; Self::BYTE_LEN] {
        self.0
    }

    /// Parse the 24-character hex form. Upper-case digits are accepted.
    pub fn parse(text: &str) -> Result<Self, IdentifierError> {
        if text.is_empty() {
            return Err(IdentifierError::Empty);
        }
        if text.len() != Self::TEXT_LEN {
            return Err(IdentifierError::InvalidLength {
                length: text.len(),
            });
        }

        let mut bytes = [0_u8; Self::BYTE_LEN];
        hex::decode_to_slice(text, &mut bytes).map_err(|_| IdentifierError::InvalidCharacters)?;
        Ok(Self(bytes))
    }

    /// Creation time embedded in the leading four bytes.
    pub fn timestamp(&self) -> DateTime<Utc> {
        let [a, b, c, d, ..] = self.0;
        let seconds = u32::from_be_bytes([a, b, c, d]);
        DateTime::from_timestamp(i64::from(seconds), 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Identifier").field(&self.to_string()).finish()
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Identifier {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}
