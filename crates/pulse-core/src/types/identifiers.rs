//! Newtype string identifiers.
//!
//! Each id type wraps a `String` to prevent cross-type confusion: an
//! `EntityId` cannot be accidentally used where a `SignalId` is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new id from anything string-like.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Tenant identifier.
    TenantId
);

define_id!(
    /// Company/entity identifier.
    EntityId
);

define_id!(
    /// Canonical signal identifier (e.g. `momentum.funding_round`).
    SignalId
);

define_id!(
    /// Raw fact identifier.
    FactId
);

define_id!(
    /// Pack identifier (version excluded; see [`PackKey`]).
    PackId
);

/// The unit of pack isolation: id plus version.
///
/// Every derived record is keyed by the `PackKey` that produced it and is
/// never read back under any other key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackKey {
    pub id: PackId,
    pub version: String,
}

impl PackKey {
    pub fn new(id: impl Into<PackId>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for PackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        let id = EntityId::new("acme");
        assert_eq!(id.as_str(), "acme");
        assert_eq!(id.to_string(), "acme");
    }

    #[test]
    fn test_pack_key_display() {
        let key = PackKey::new("default", "3");
        assert_eq!(key.to_string(), "default@3");
    }

    #[test]
    fn test_ids_are_ordered() {
        let mut ids = vec![FactId::new("b"), FactId::new("a")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "a");
    }
}
