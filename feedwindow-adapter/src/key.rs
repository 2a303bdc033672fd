use alloc::string::String;
use core::fmt;

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

#[cfg(feature = "std")]
pub(crate) type ListKeyMap<V> = HashMap<ListKey, V>;
#[cfg(not(feature = "std"))]
pub(crate) type ListKeyMap<V> = BTreeMap<ListKey, V>;

/// Caller-supplied identity of a feed (e.g. `"home"`, `"profile:npub1..."`, `"hashtag:rust"`).
///
/// Heights and scroll positions are namespaced by this key, so two feeds never share them.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ListKey(String);

impl ListKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ListKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ListKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Debug for ListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ListKey").field(&self.0).finish()
    }
}

impl fmt::Display for ListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
