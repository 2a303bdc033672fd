use alloc::sync::Arc;

use crate::virtualizer::Virtualizer;
use crate::{HeightEstimator, VirtualRow};

/// A callback fired when a virtualizer state update occurs.
///
/// The second argument is `is_scrolling`.
pub type OnChangeCallback<K> = Arc<dyn Fn(&Virtualizer<K>, bool) + Send + Sync>;

/// Decides whether a size change of a row should shift the scroll offset by the same delta.
///
/// The default keeps content under the reader still: rows that start above the current offset
/// shift it, rows inside or below the viewport do not.
pub type AdjustOffsetOnResizeCallback<K> =
    Arc<dyn Fn(&Virtualizer<K>, &VirtualRow<K>, i64) -> bool + Send + Sync>;

/// Overscan used when nothing is known about the device.
pub const DEFAULT_OVERSCAN: usize = 3;

/// Configuration for [`crate::Virtualizer`].
///
/// Cheap to clone: callbacks are stored in `Arc`s.
pub struct VirtualizerOptions<K> {
    pub estimator: HeightEstimator,
    /// Rows mounted beyond each edge of the viewport.
    pub overscan: usize,
    /// Space before the first row (e.g. a composer above the feed).
    pub padding_start: u32,
    /// Space after the last row (e.g. the load-more sentinel).
    pub padding_end: u32,
    /// Offset used on construction and by `Virtualizer::reset_scroll`.
    pub initial_offset: u64,
    pub on_change: Option<OnChangeCallback<K>>,
    /// Quiet period after the last scroll event before `is_scrolling` resets.
    pub scroll_idle_ms: u64,
    pub adjust_offset_on_resize: Option<AdjustOffsetOnResizeCallback<K>>,
}

impl<K> Clone for VirtualizerOptions<K> {
    fn clone(&self) -> Self {
        Self {
            estimator: self.estimator,
            overscan: self.overscan,
            padding_start: self.padding_start,
            padding_end: self.padding_end,
            initial_offset: self.initial_offset,
            on_change: self.on_change.clone(),
            scroll_idle_ms: self.scroll_idle_ms,
            adjust_offset_on_resize: self.adjust_offset_on_resize.clone(),
        }
    }
}

impl<K> Default for VirtualizerOptions<K> {
    fn default() -> Self {
        Self::new(HeightEstimator::default())
    }
}

impl<K> VirtualizerOptions<K> {
    pub fn new(estimator: HeightEstimator) -> Self {
        Self {
            estimator,
            overscan: DEFAULT_OVERSCAN,
            padding_start: 0,
            padding_end: 0,
            initial_offset: 0,
            on_change: None,
            scroll_idle_ms: 150,
            adjust_offset_on_resize: None,
        }
    }

    pub fn with_estimator(mut self, estimator: HeightEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_padding(mut self, padding_start: u32, padding_end: u32) -> Self {
        self.padding_start = padding_start;
        self.padding_end = padding_end;
        self
    }

    pub fn with_initial_offset(mut self, initial_offset: u64) -> Self {
        self.initial_offset = initial_offset;
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&Virtualizer<K>, bool) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_scroll_idle_ms(mut self, idle_ms: u64) -> Self {
        self.scroll_idle_ms = idle_ms;
        self
    }

    pub fn with_adjust_offset_on_resize(
        mut self,
        f: Option<impl Fn(&Virtualizer<K>, &VirtualRow<K>, i64) -> bool + Send + Sync + 'static>,
    ) -> Self {
        self.adjust_offset_on_resize = f.map(|f| Arc::new(f) as _);
        self
    }
}

impl<K> core::fmt::Debug for VirtualizerOptions<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualizerOptions")
            .field("estimator", &self.estimator)
            .field("overscan", &self.overscan)
            .field("padding_start", &self.padding_start)
            .field("padding_end", &self.padding_end)
            .field("initial_offset", &self.initial_offset)
            .field("scroll_idle_ms", &self.scroll_idle_ms)
            .finish_non_exhaustive()
    }
}
