use std::collections::HashMap;
use std::fmt;

/// Opaque entity identifier handed out by the external entity store.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a track inside one [`crate::MergedTracks`].
///
/// Only meaningful together with the merged tracks it was issued by.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TrackId(pub(crate) u32);

impl TrackId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CommandId(pub(crate) u64);

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cmd#{}", self.0)
    }
}

/// Name table mapping track names to dense ids in declaration order.
///
/// Duplicate names keep the first declaration as the canonical id; later
/// duplicates are still addressable by id.
#[derive(Clone, Debug, Default)]
pub(crate) struct NameTable {
    names: Vec<String>,
    index: HashMap<String, TrackId>,
}

impl NameTable {
    pub(crate) fn push(&mut self, name: &str) -> TrackId {
        let id = TrackId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.index.entry(name.to_string()).or_insert(id);
        id
    }

    pub(crate) fn get(&self, name: &str) -> Option<TrackId> {
        self.index.get(name).copied()
    }

    pub(crate) fn name(&self, id: TrackId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }
}
