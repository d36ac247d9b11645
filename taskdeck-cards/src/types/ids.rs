//! Typed identifiers for board entities.
//!
//! The remote store hands out opaque string ids. Wrapping them keeps a list id
//! from being passed where a tag id is expected.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Board identifier
    BoardId
);
string_id!(
    /// List (column) identifier
    ListId
);
string_id!(
    /// Tag (label) identifier
    TagId
);
string_id!(
    /// Card identifier
    CardId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip_is_transparent() {
        let id = CardId::from_string("5b1f00aa");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"5b1f00aa\"");
        assert_eq!(id.to_string(), "5b1f00aa");
    }
}
