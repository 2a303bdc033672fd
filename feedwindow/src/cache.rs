use alloc::vec::Vec;

use crate::key::{FeedKey, KeySizeMap};

/// A rejected height report. The previous estimate or measurement stays in effect.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum MeasurementError {
    #[error("measured height must be a positive finite number (got {0})")]
    Invalid(f64),
    #[error("measured height must be positive (got 0)")]
    Zero,
}

/// Converts a reported pixel height into a whole-pixel size, rounding up.
pub fn size_from_px(px: f64) -> Result<u32, MeasurementError> {
    if !px.is_finite() || px <= 0.0 {
        return Err(MeasurementError::Invalid(px));
    }
    // `as` saturates for values above u32::MAX.
    let whole = px as u32;
    if (whole as f64) < px {
        Ok(whole.saturating_add(1))
    } else {
        Ok(whole)
    }
}

/// Measured heights by item id.
///
/// A stored height is authoritative for its id until [`HeightCache::clear`] runs, which happens
/// whenever the list identity changes.
#[derive(Clone, Debug)]
pub struct HeightCache<K> {
    sizes: KeySizeMap<K>,
}

impl<K: FeedKey> Default for HeightCache<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: FeedKey> HeightCache<K> {
    pub fn new() -> Self {
        Self {
            sizes: KeySizeMap::<K>::new(),
        }
    }

    pub fn get(&self, id: &K) -> Option<u32> {
        self.sizes.get(id).copied()
    }

    /// Stores `size` for `id`.
    ///
    /// Returns `Ok(true)` only when the stored value changed, so callers can skip layout work
    /// for repeated identical reports.
    pub fn try_set(&mut self, id: K, size: u32) -> Result<bool, MeasurementError> {
        if size == 0 {
            return Err(MeasurementError::Zero);
        }
        match self.sizes.get(&id) {
            Some(&cur) if cur == size => Ok(false),
            _ => {
                self.sizes.insert(id, size);
                Ok(true)
            }
        }
    }

    /// Like [`Self::try_set`], treating a rejected size as "no change".
    pub fn set(&mut self, id: K, size: u32) -> bool {
        self.try_set(id, size).unwrap_or(false)
    }

    pub fn remove(&mut self, id: &K) -> Option<u32> {
        self.sizes.remove(id)
    }

    pub fn clear(&mut self) {
        self.sizes.clear();
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn for_each(&self, mut f: impl FnMut(&K, u32)) {
        for (k, v) in self.sizes.iter() {
            f(k, *v);
        }
    }

    pub fn export(&self) -> Vec<(K, u32)> {
        let mut out = Vec::with_capacity(self.sizes.len());
        self.for_each(|k, v| out.push((k.clone(), v)));
        out
    }
}
