use alloc::sync::Arc;
use core::cmp;

use crate::key::{FeedKey, KeySet};
use crate::{ScrollDirection, VirtualRange, Virtualizer};

/// A callback fired when the published visible/preload sets change membership.
pub type OnVisibilityChange<K> = Arc<dyn Fn(&VisibilitySnapshot<K>) + Send + Sync>;

/// Tuning for [`VisibilityTracker`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackerOptions {
    /// Quiet period after the last scroll event before recomputing.
    pub debounce_ms: u64,
    /// Preload window while scrolling toward the list end.
    pub forward_preload: usize,
    /// Preload window otherwise (scrolling back, or no movement yet).
    pub backward_preload: usize,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            forward_preload: 5,
            backward_preload: 2,
        }
    }
}

/// The visible and preload id sets at one point in time.
///
/// Equality compares set membership only.
#[derive(Clone, Debug)]
pub struct VisibilitySnapshot<K> {
    pub visible: KeySet<K>,
    pub preload: KeySet<K>,
    pub visible_range: VirtualRange,
    pub preload_range: VirtualRange,
}

impl<K: FeedKey> Default for VisibilitySnapshot<K> {
    fn default() -> Self {
        Self {
            visible: KeySet::new(),
            preload: KeySet::new(),
            visible_range: VirtualRange::EMPTY,
            preload_range: VirtualRange::EMPTY,
        }
    }
}

impl<K: FeedKey> PartialEq for VisibilitySnapshot<K> {
    fn eq(&self, other: &Self) -> bool {
        self.visible == other.visible && self.preload == other.preload
    }
}

/// Debounced visible/preload tracking on top of a [`Virtualizer`].
///
/// Scroll events only arm a deadline; the sets are recomputed by [`Self::tick`] once the quiet
/// period has passed, and published only when membership changed.
pub struct VisibilityTracker<K> {
    options: TrackerOptions,
    current: VisibilitySnapshot<K>,
    deadline_ms: Option<u64>,
    last_offset: Option<u64>,
    direction: Option<ScrollDirection>,
    revision: u64,
    on_change: Option<OnVisibilityChange<K>>,
}

impl<K: FeedKey + core::fmt::Debug> core::fmt::Debug for VisibilityTracker<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VisibilityTracker")
            .field("options", &self.options)
            .field("current", &self.current)
            .field("deadline_ms", &self.deadline_ms)
            .field("direction", &self.direction)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl<K: FeedKey> VisibilityTracker<K> {
    pub fn new(options: TrackerOptions) -> Self {
        Self {
            options,
            current: VisibilitySnapshot::default(),
            deadline_ms: None,
            last_offset: None,
            direction: None,
            revision: 0,
            on_change: None,
        }
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&VisibilitySnapshot<K>) + Send + Sync + 'static>,
    ) -> Self {
        self.set_on_change(on_change);
        self
    }

    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&VisibilitySnapshot<K>) + Send + Sync + 'static>,
    ) {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
    }

    pub fn options(&self) -> TrackerOptions {
        self.options
    }

    pub fn snapshot(&self) -> &VisibilitySnapshot<K> {
        &self.current
    }

    pub fn is_visible(&self, id: &K) -> bool {
        self.current.visible.contains(id)
    }

    pub fn should_preload(&self, id: &K) -> bool {
        self.current.preload.contains(id)
    }

    pub fn direction(&self) -> Option<ScrollDirection> {
        self.direction
    }

    /// Number of times a changed snapshot has been published.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Records a scroll offset and (re)arms the debounce deadline.
    ///
    /// Direction comes from the delta against the previously recorded offset; an unchanged
    /// offset keeps the last direction.
    pub fn on_scroll(&mut self, offset: u64, now_ms: u64) {
        if let Some(prev) = self.last_offset {
            self.direction = match offset.cmp(&prev) {
                cmp::Ordering::Greater => Some(ScrollDirection::Forward),
                cmp::Ordering::Less => Some(ScrollDirection::Backward),
                cmp::Ordering::Equal => self.direction,
            };
        }
        self.last_offset = Some(offset);
        self.invalidate(now_ms);
    }

    /// Arms the debounce deadline without a scroll (resize, new items, measurements).
    pub fn invalidate(&mut self, now_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(self.options.debounce_ms));
    }

    /// Drops a pending recompute.
    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    /// Cancels pending work and forgets the published sets and scroll history.
    pub fn reset(&mut self) {
        self.cancel();
        self.last_offset = None;
        self.direction = None;
        self.current = VisibilitySnapshot::default();
    }

    /// Recomputes if the debounce deadline has passed. Returns `true` when a changed snapshot
    /// was published.
    pub fn tick(&mut self, now_ms: u64, v: &Virtualizer<K>) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                self.recompute(v)
            }
            _ => false,
        }
    }

    /// Recomputes immediately, bypassing the debounce. Returns `true` when published.
    pub fn recompute(&mut self, v: &Virtualizer<K>) -> bool {
        let next = self.compute(v);
        if next == self.current {
            return false;
        }
        self.current = next;
        self.revision = self.revision.wrapping_add(1);
        vtrace!(
            visible = self.current.visible.len(),
            preload = self.current.preload.len(),
            revision = self.revision,
            "visibility published"
        );
        if let Some(cb) = &self.on_change {
            cb(&self.current);
        }
        true
    }

    /// Pure computation of the sets for the virtualizer's current state.
    pub fn compute(&self, v: &Virtualizer<K>) -> VisibilitySnapshot<K> {
        let visible_range = v.visible_range();
        let preload_range = self.preload_range(visible_range, v.count());

        let mut snapshot = VisibilitySnapshot {
            visible: KeySet::new(),
            preload: KeySet::new(),
            visible_range,
            preload_range,
        };
        for i in visible_range.start_index..visible_range.end_index {
            if let Some(key) = v.key_for(i) {
                snapshot.visible.insert(key.clone());
            }
        }
        for i in preload_range.start_index..preload_range.end_index {
            if let Some(key) = v.key_for(i) {
                snapshot.preload.insert(key.clone());
            }
        }
        snapshot
    }

    fn preload_range(&self, visible: VirtualRange, count: usize) -> VirtualRange {
        if visible.is_empty() {
            return VirtualRange::EMPTY;
        }
        match self.direction {
            Some(ScrollDirection::Backward) => VirtualRange {
                start_index: visible
                    .start_index
                    .saturating_sub(self.options.backward_preload),
                end_index: visible.start_index,
            },
            Some(ScrollDirection::Forward) => VirtualRange {
                start_index: visible.end_index,
                end_index: cmp::min(
                    count,
                    visible.end_index.saturating_add(self.options.forward_preload),
                ),
            },
            None => VirtualRange {
                start_index: visible.end_index,
                end_index: cmp::min(
                    count,
                    visible
                        .end_index
                        .saturating_add(self.options.backward_preload),
                ),
            },
        }
    }
}
