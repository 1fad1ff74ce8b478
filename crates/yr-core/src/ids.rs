use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Compact, stable identifier for a component inside one analysis.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<NodeId>` to be pointer-optimized
///
/// On the wire the id is the plain 0-based index.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    /// Largest index an analysis may hand out.
    pub const MAX_INDEX: u32 = u32::MAX - 1;

    /// Create an id from a 0-based index by storing index+1.
    ///
    /// Indices above [`NodeId::MAX_INDEX`] saturate; the registration counter
    /// refuses to go past it.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.index())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.index())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let index = u32::deserialize(deserializer)?;
        if index > Self::MAX_INDEX {
            return Err(serde::de::Error::custom(format!(
                "node id {index} out of range"
            )));
        }
        Ok(Self::from_index(index))
    }
}
