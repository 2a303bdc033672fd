use feedwindow::TrackerOptions;

use crate::tween::Easing;

/// Per-feed tuning. All durations are in milliseconds of the caller's clock.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FeedConfig {
    /// Quiet period before visibility is recomputed after a scroll event.
    pub debounce_ms: u64,
    /// Rows preloaded past the viewport in the scroll direction.
    pub forward_preload: usize,
    /// Rows preloaded against the scroll direction (or past the end before any scroll).
    pub backward_preload: usize,
    /// A load-more latch is released at the latest this long after it fired.
    pub cooldown_ms: u64,
    /// Sentinel visibility ratio that triggers a load.
    pub intersection_threshold: f32,
    /// Height of the sentinel row placed after the last item.
    pub sentinel_size: u32,
    /// Distance below the viewport at which the sentinel already counts as in view.
    pub sentinel_root_margin: u32,
    /// Minimum interval between captured scroll offsets.
    pub capture_interval_ms: u64,
    /// The scroll-to-top affordance shows past this offset.
    pub scroll_to_top_threshold: u64,
    pub scroll_to_top_duration_ms: u64,
    pub scroll_to_top_easing: Easing,
    /// Quiet period after which the list stops reporting `is_scrolling`.
    pub scroll_idle_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        let tracker = TrackerOptions::default();
        Self {
            debounce_ms: tracker.debounce_ms,
            forward_preload: tracker.forward_preload,
            backward_preload: tracker.backward_preload,
            cooldown_ms: 1_000,
            intersection_threshold: 0.5,
            sentinel_size: 100,
            sentinel_root_margin: 300,
            capture_interval_ms: 16,
            scroll_to_top_threshold: 800,
            scroll_to_top_duration_ms: 400,
            scroll_to_top_easing: Easing::default(),
            scroll_idle_ms: 150,
        }
    }
}

impl FeedConfig {
    pub fn tracker_options(&self) -> TrackerOptions {
        TrackerOptions {
            debounce_ms: self.debounce_ms,
            forward_preload: self.forward_preload,
            backward_preload: self.backward_preload,
        }
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn with_preload(mut self, forward: usize, backward: usize) -> Self {
        self.forward_preload = forward;
        self.backward_preload = backward;
        self
    }

    pub fn with_cooldown_ms(mut self, cooldown_ms: u64) -> Self {
        self.cooldown_ms = cooldown_ms;
        self
    }

    pub fn with_intersection_threshold(mut self, threshold: f32) -> Self {
        self.intersection_threshold = threshold;
        self
    }

    pub fn with_capture_interval_ms(mut self, interval_ms: u64) -> Self {
        self.capture_interval_ms = interval_ms;
        self
    }
}
