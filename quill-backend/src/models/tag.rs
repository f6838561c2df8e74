use serde::{Deserialize, Serialize};

/// A tag label. Created lazily on first reference, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}
