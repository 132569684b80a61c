//! Storage tier identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two physical storage locations for file bytes.
///
/// Uploads land in the cache tier; the migration worker relocates them to
/// the storage tier. The metadata store records which tier currently holds
/// a file's authoritative bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Fast tier where uploads land.
    Cache,
    /// Bulk tier where files end up after migration.
    Storage,
}

impl Tier {
    /// The string form persisted in the metadata store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Storage => "storage",
        }
    }

    /// Parse from the persisted string form.
    pub fn parse(s: &str) -> crate::Result<Self> {
        match s {
            "cache" => Ok(Self::Cache),
            "storage" => Ok(Self::Storage),
            other => Err(crate::Error::InvalidTier(other.to_string())),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        assert_eq!(Tier::parse("cache").unwrap(), Tier::Cache);
        assert_eq!(Tier::parse("storage").unwrap(), Tier::Storage);
        assert_eq!(Tier::parse(Tier::Cache.as_str()).unwrap(), Tier::Cache);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(Tier::parse("CACHE").is_err());
        assert!(Tier::parse("cold").is_err());
    }
}
