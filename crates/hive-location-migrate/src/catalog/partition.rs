//! Partition keys as reported by `SHOW PARTITIONS`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A partition of a table, e.g. `dt=2024-01-01/hour=00`.
///
/// Kept in the serialized form the metastore reports: `column=value` pairs
/// joined by `/`, in the catalog's key order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionKey(String);

impl PartitionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `column=value` pairs in catalog order.
    pub fn pairs(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Partition spec for use inside `PARTITION(...)`: `a=1, b=2`.
    pub fn to_spec(&self) -> String {
        self.pairs().collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PartitionKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}
