//! Typed identifiers.
//!
//! Every identifier is a UUID rendered as its hyphenated string form when
//! stored, so documents round-trip identically through BSON and JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raised when a string is not a well-formed identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {kind} identifier: {value:?}")]
pub struct IdError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(into = "String", try_from = "String")]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self).map_err(|_| IdError {
                    kind: $kind,
                    value: s.to_string(),
                })
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0.to_string()
            }
        }
    };
}

define_id!(
    /// Key of a user document.
    UserId,
    "user"
);
define_id!(
    /// Catalog product identifier.
    ProductId,
    "product"
);
define_id!(
    /// Order identifier, unique within a user's history.
    OrderId,
    "order"
);
define_id!(
    /// Address identifier.
    AddressId,
    "address"
);
define_id!(
    /// Identity of a single cart entry.
    ///
    /// Two entries for the same product are distinct entries; checkout copies
    /// and removes entries by this identity.
    EntryId,
    "entry"
);
