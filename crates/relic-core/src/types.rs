//! Opaque identifier newtypes
//!
//! Resource and version identifiers are opaque strings assigned by the
//! catalog; nothing in this workspace parses or interprets them. Newtypes
//! keep the id spaces from being mixed up at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap a raw identifier string
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The raw identifier string
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
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id! {
    /// Identifier of a resource in the catalog
    ResourceId
}

string_id! {
    /// Identifier of one immutable version of a resource
    VersionId
}

string_id! {
    /// Identifier of a release (a publishable packaging of a resource)
    ReleaseId
}

string_id! {
    /// Identifier of a signed licensing contract
    ContractId
}

string_id! {
    /// Identifier of a licensing policy attached to a resource
    PolicyId
}

string_id! {
    /// Deterministic identifier of a persisted release scheme
    SchemeId
}

/// Numeric identifier of the user owning a resource or release
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_spaces_are_distinct_types() {
        let resource = ResourceId::from("res-1");
        let version = VersionId::from("res-1");
        assert_eq!(resource.as_str(), version.as_str());
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = ResourceId::from("res-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"res-42\"");
    }
}
