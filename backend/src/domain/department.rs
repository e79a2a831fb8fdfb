//! Department reference data.

use serde::{Deserialize, Serialize};

/// Numeric department identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentId(i32);

impl DepartmentId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn value(self) -> i32 {
        self.0
    }
}

/// Academic department seeded by migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub id: DepartmentId,
    /// Short code such as `CSE`, at most four characters.
    pub code: String,
    pub name: String,
}
