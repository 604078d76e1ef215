use serde::{Deserialize, Serialize};

use super::Snowflake;

/// Key under which an accepted event is stored in the collected map
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IdentityKey {
    /// A single identifier, e.g. the interaction id for one-shot collection
    Id(Snowflake),
    /// Two identifiers, e.g. channel and actor for one vote per actor
    Pair(Snowflake, Snowflake),
    /// Free-form key
    Text(String),
}

impl From<Snowflake> for IdentityKey {
    fn from(id: Snowflake) -> Self {
        IdentityKey::Id(id)
    }
}

impl From<(Snowflake, Snowflake)> for IdentityKey {
    fn from((a, b): (Snowflake, Snowflake)) -> Self {
        IdentityKey::Pair(a, b)
    }
}

impl From<String> for IdentityKey {
    fn from(text: String) -> Self {
        IdentityKey::Text(text)
    }
}

impl From<&str> for IdentityKey {
    fn from(text: &str) -> Self {
        IdentityKey::Text(text.to_string())
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityKey::Id(id) => write!(f, "{}", id),
            IdentityKey::Pair(a, b) => write!(f, "{}:{}", a, b),
            IdentityKey::Text(text) => write!(f, "{}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_key_conversions() {
        assert_eq!(IdentityKey::from(5), IdentityKey::Id(5));
        assert_eq!(IdentityKey::from((1, 2)), IdentityKey::Pair(1, 2));
        assert_eq!(IdentityKey::from("yes"), IdentityKey::Text("yes".to_string()));
    }

    #[test]
    fn test_identity_key_pair_is_ordered() {
        assert_ne!(IdentityKey::Pair(1, 2), IdentityKey::Pair(2, 1));
        assert_eq!(format!("{}", IdentityKey::Pair(1, 2)), "1:2");
    }
}
