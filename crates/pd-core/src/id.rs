//! Node identifiers.
//!
//! A page keeps the id a node was created with for its whole life: through
//! patches, undo/redo snapshots, publish and reload. Ids travel as plain
//! strings in the attribute contract and persisted blobs; inside the engine
//! they are interned handles so snapshots copy them for free.

use lasso::{Spur, ThreadedRodeo};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

static PAGE_IDS: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Handle for a node (or Q&A / menu item) id.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    /// Id for `s`. The same text always yields the same handle.
    pub fn intern(s: &str) -> Self {
        NodeId(PAGE_IDS.get_or_intern(s))
    }

    /// Like [`intern`](Self::intern), but refuses blank text. Used for ids
    /// arriving from the host or a stored page.
    pub fn parse(s: &str) -> Option<Self> {
        (!s.trim().is_empty()).then(|| Self::intern(s))
    }

    /// A new random id for a palette drop, duplicate, or added item.
    pub fn fresh() -> Self {
        Self::intern(&uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        PAGE_IDS.resolve(&self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NodeId::parse(&raw).ok_or_else(|| D::Error::custom("node id must not be blank"))
    }
}
