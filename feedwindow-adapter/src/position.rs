use crate::config::FeedConfig;
use crate::key::{ListKey, ListKeyMap};
use crate::tween::{Easing, ScrollAnimation};

/// Persisted scroll position of one feed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollState {
    pub list_key: ListKey,
    pub offset: u64,
    pub total_size: u64,
}

/// Scroll positions by list key. Outlives any single mounted feed.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ScrollPositionStore {
    states: ListKeyMap<ScrollState>,
}

impl ScrollPositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&mut self, state: ScrollState) {
        atrace!(list_key = %state.list_key, offset = state.offset, "save scroll state");
        self.states.insert(state.list_key.clone(), state);
    }

    pub fn get(&self, list_key: &ListKey) -> Option<&ScrollState> {
        self.states.get(list_key)
    }

    pub fn remove(&mut self, list_key: &ListKey) -> Option<ScrollState> {
        self.states.remove(list_key)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}

/// Where a new offset came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OffsetUpdate {
    /// Captured from the user's scrolling. The container is already there.
    Captured(u64),
    /// Produced by the engine (restore, scroll-to-top, jump prevention). The adapter must write
    /// it into the scroll container.
    Programmatic(u64),
}

impl OffsetUpdate {
    pub fn offset(self) -> u64 {
        match self {
            Self::Captured(offset) | Self::Programmatic(offset) => offset,
        }
    }

    pub fn is_programmatic(self) -> bool {
        matches!(self, Self::Programmatic(_))
    }
}

/// Owns the current scroll offset of a feed.
///
/// Captures are throttled to one per `capture_interval_ms`; the trailing sample of a burst is
/// committed by [`ScrollPositionManager::tick`].
#[derive(Clone, Debug)]
pub struct ScrollPositionManager {
    list_key: ListKey,
    offset: u64,
    total_size: u64,
    touched: bool,
    pending: Option<u64>,
    last_commit_ms: Option<u64>,
    capture_interval_ms: u64,
    top_threshold: u64,
    top_duration_ms: u64,
    top_easing: Easing,
    reduced_motion: bool,
    animation: Option<ScrollAnimation>,
}

impl ScrollPositionManager {
    pub fn new(list_key: ListKey, config: &FeedConfig, reduced_motion: bool) -> Self {
        Self {
            list_key,
            offset: 0,
            total_size: 0,
            touched: false,
            pending: None,
            last_commit_ms: None,
            capture_interval_ms: config.capture_interval_ms,
            top_threshold: config.scroll_to_top_threshold,
            top_duration_ms: config.scroll_to_top_duration_ms,
            top_easing: config.scroll_to_top_easing,
            reduced_motion,
            animation: None,
        }
    }

    pub fn list_key(&self) -> &ListKey {
        &self.list_key
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn has_pending_capture(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn set_total_size(&mut self, total_size: u64) {
        self.total_size = total_size;
    }

    /// Loads the saved offset for this list, if any.
    pub fn restore(&mut self, store: &ScrollPositionStore) -> Option<u64> {
        let state = store.get(&self.list_key)?;
        self.offset = state.offset;
        self.total_size = state.total_size;
        self.touched = true;
        adebug!(list_key = %self.list_key, offset = self.offset, "restore scroll state");
        Some(self.offset)
    }

    /// Current state, or `None` while nothing has been captured or restored.
    pub fn snapshot(&self) -> Option<ScrollState> {
        if !self.touched {
            return None;
        }
        Some(ScrollState {
            list_key: self.list_key.clone(),
            offset: self.pending.unwrap_or(self.offset),
            total_size: self.total_size,
        })
    }

    pub fn save(&self, store: &mut ScrollPositionStore) {
        if let Some(state) = self.snapshot() {
            store.save(state);
        }
    }

    /// Forgets everything and starts over for `list_key`.
    pub fn reset(&mut self, list_key: ListKey) {
        self.list_key = list_key;
        self.offset = 0;
        self.total_size = 0;
        self.touched = false;
        self.pending = None;
        self.last_commit_ms = None;
        self.animation = None;
    }

    /// A scroll event from the container.
    ///
    /// An event at the last animated offset is the echo of a programmatic write and is ignored;
    /// any other offset cancels a running animation.
    pub fn on_scroll(&mut self, offset: u64, now_ms: u64) -> Option<OffsetUpdate> {
        if self.animation.is_some() && offset == self.offset {
            return None;
        }
        self.animation = None;
        self.touched = true;
        let due = self
            .last_commit_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.capture_interval_ms);
        if due {
            self.commit(offset, now_ms);
            Some(OffsetUpdate::Captured(offset))
        } else {
            self.pending = Some(offset);
            None
        }
    }

    /// Commits an engine-side offset immediately, bypassing the throttle.
    pub fn jump_to(&mut self, offset: u64, now_ms: u64) -> OffsetUpdate {
        self.animation = None;
        self.touched = true;
        self.commit(offset, now_ms);
        OffsetUpdate::Programmatic(offset)
    }

    /// Commits a throttled capture right away, ignoring the interval.
    pub fn flush_pending(&mut self, now_ms: u64) -> Option<OffsetUpdate> {
        let pending = self.pending?;
        self.commit(pending, now_ms);
        Some(OffsetUpdate::Captured(pending))
    }

    /// Moves the offset to follow content that changed size above it.
    ///
    /// Unlike [`Self::jump_to`] this keeps a running animation; its origin moves by the same
    /// amount so the remaining frames still end at the target.
    pub fn follow_layout(&mut self, offset: u64, now_ms: u64) -> OffsetUpdate {
        if let Some(animation) = &mut self.animation {
            animation.origin = if offset >= self.offset {
                animation.origin.saturating_add(offset - self.offset)
            } else {
                animation.origin.saturating_sub(self.offset - offset)
            };
        }
        self.touched = true;
        self.commit(offset, now_ms);
        OffsetUpdate::Programmatic(offset)
    }

    /// Advances a running animation or flushes a throttled capture.
    pub fn tick(&mut self, now_ms: u64) -> Option<OffsetUpdate> {
        if let Some(animation) = self.animation {
            let offset = animation.offset_at(now_ms);
            if animation.finished(now_ms) {
                self.animation = None;
            }
            self.commit(offset, now_ms);
            return Some(OffsetUpdate::Programmatic(offset));
        }

        let pending = self.pending?;
        let due = self
            .last_commit_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.capture_interval_ms);
        if !due {
            return None;
        }
        self.commit(pending, now_ms);
        Some(OffsetUpdate::Captured(pending))
    }

    /// Scrolls back to the first post.
    ///
    /// Jumps immediately when reduced motion is preferred (the jump is returned); otherwise
    /// starts an animation that [`Self::tick`] drives and returns `None`.
    pub fn scroll_to_top(&mut self, now_ms: u64) -> Option<OffsetUpdate> {
        if self.reduced_motion || self.offset == 0 {
            return Some(self.jump_to(0, now_ms));
        }
        self.pending = None;
        self.animation = Some(ScrollAnimation::to_top(
            self.offset,
            now_ms,
            self.top_duration_ms,
            self.top_easing,
        ));
        adebug!(from = self.offset, now_ms, "scroll to top");
        None
    }

    pub fn show_scroll_to_top_button(&self) -> bool {
        self.offset > self.top_threshold
    }

    fn commit(&mut self, offset: u64, now_ms: u64) {
        self.offset = offset;
        self.pending = None;
        self.last_commit_ms = Some(now_ms);
    }
}
