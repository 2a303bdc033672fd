#[cfg(not(feature = "std"))]
use alloc::collections::{BTreeMap, BTreeSet};
#[cfg(feature = "std")]
use std::collections::{HashMap, HashSet};

#[cfg(feature = "std")]
pub(crate) type KeySizeMap<K> = HashMap<K, u32>;
#[cfg(not(feature = "std"))]
pub(crate) type KeySizeMap<K> = BTreeMap<K, u32>;

#[cfg(feature = "std")]
pub(crate) type KeyIndexMap<K> = HashMap<K, usize>;
#[cfg(not(feature = "std"))]
pub(crate) type KeyIndexMap<K> = BTreeMap<K, usize>;

/// A set of item ids, compared by membership.
#[cfg(feature = "std")]
pub type KeySet<K> = HashSet<K>;
/// A set of item ids, compared by membership.
#[cfg(not(feature = "std"))]
pub type KeySet<K> = BTreeSet<K>;

/// Bound for item ids used as cache/set keys.
///
/// With `std` this is `Hash + Eq + Clone`; without it, `Ord + Clone`.
#[cfg(feature = "std")]
#[doc(hidden)]
pub trait FeedKey: core::hash::Hash + Eq + Clone {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq + Clone> FeedKey for K {}

#[cfg(not(feature = "std"))]
#[doc(hidden)]
pub trait FeedKey: Ord + Clone {}
#[cfg(not(feature = "std"))]
impl<K: Ord + Clone> FeedKey for K {}
