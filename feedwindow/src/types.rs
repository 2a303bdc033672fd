use crate::ContentSignals;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    Auto,
}

/// Direction of the last offset change, toward the list end (`Forward`) or its start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualRange {
    pub start_index: usize,
    pub end_index: usize, // exclusive
}

impl VirtualRange {
    pub const EMPTY: Self = Self {
        start_index: 0,
        end_index: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index
    }
}

/// A row the adapter should mount: position and size on the scroll axis.
///
/// Rows are always derived from the current items, heights and viewport; never store them.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualRow<K> {
    pub key: K,
    pub index: usize,
    /// Start offset in the scroll axis (includes `padding_start`).
    pub start: u64,
    pub size: u32,
}

impl<K> VirtualRow<K> {
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.size as u64)
    }
}

/// A feed entry as seen by the engine: an opaque id and the content signals used for estimation.
///
/// The data layer owns the real post; only these fields are read.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeedItem<K> {
    pub id: K,
    pub signals: ContentSignals,
}

impl<K> FeedItem<K> {
    pub fn new(id: K, signals: ContentSignals) -> Self {
        Self { id, signals }
    }
}
