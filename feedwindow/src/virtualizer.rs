use alloc::vec::Vec;
use core::cell::Cell;
use core::cmp;

use crate::key::{FeedKey, KeyIndexMap};
use crate::prefix::PrefixTable;
use crate::{
    Align, ContentSignals, FeedItem, HeightCache, MeasurementError, ScrollDirection,
    VirtualRange, VirtualRow, VirtualizerOptions,
};

/// Smallest size a row can take. Keeps offset search terminating for degenerate estimates.
pub const MIN_ITEM_SIZE: u32 = 1;

/// A headless feed virtualizer.
///
/// Owns the ordered item ids, the measured-height cache and a cumulative-offset table. Your
/// adapter drives it with viewport geometry and scroll offsets, reports measured heights, and
/// reads back the bounded set of rows to mount.
///
/// Row count stays bounded by `ceil(viewport / smallest_row) + 1 + 2 * overscan` no matter how
/// many items the feed holds.
#[derive(Clone, Debug)]
pub struct Virtualizer<K> {
    options: VirtualizerOptions<K>,
    viewport_size: u32,
    scroll_offset: u64,
    is_scrolling: bool,
    scroll_direction: Option<ScrollDirection>,
    last_scroll_event_ms: Option<u64>,

    keys: Vec<K>,
    signals: Vec<ContentSignals>,
    index_by_key: KeyIndexMap<K>,
    sizes: Vec<u32>,
    measured: Vec<bool>,
    sums: PrefixTable,
    heights: HeightCache<K>,

    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl<K: FeedKey> Virtualizer<K> {
    pub fn new(options: VirtualizerOptions<K>) -> Self {
        let scroll_offset = options.initial_offset;
        vdebug!(
            overscan = options.overscan,
            scroll_offset,
            "Virtualizer::new"
        );
        Self {
            viewport_size: 0,
            scroll_offset,
            is_scrolling: false,
            scroll_direction: None,
            last_scroll_event_ms: None,
            keys: Vec::new(),
            signals: Vec::new(),
            index_by_key: KeyIndexMap::<K>::new(),
            sizes: Vec::new(),
            measured: Vec::new(),
            sums: PrefixTable::new(),
            heights: HeightCache::new(),
            options,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        }
    }

    pub fn options(&self) -> &VirtualizerOptions<K> {
        &self.options
    }

    pub fn set_options(&mut self, options: VirtualizerOptions<K>) {
        let estimator_changed = self.options.estimator != options.estimator;
        self.options = options;
        vtrace!(
            overscan = self.options.overscan,
            estimator_changed,
            "Virtualizer::set_options"
        );
        if estimator_changed {
            self.rebuild_sizes();
        }
        self.notify();
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut VirtualizerOptions<K>)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&Virtualizer<K>, bool) + Send + Sync + 'static>,
    ) {
        self.options.on_change = on_change.map(|f| alloc::sync::Arc::new(f) as _);
        self.notify();
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        if self.options.overscan == overscan {
            return;
        }
        self.options.overscan = overscan;
        self.notify();
    }

    fn notify_now(&self) {
        if let Some(cb) = &self.options.on_change {
            cb(self, self.is_scrolling);
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    /// Batches multiple updates into a single `on_change` notification.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }

    // Items.

    pub fn count(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key_for(&self, index: usize) -> Option<&K> {
        self.keys.get(index)
    }

    pub fn index_of(&self, id: &K) -> Option<usize> {
        self.index_by_key.get(id).copied()
    }

    pub fn signals_for(&self, index: usize) -> Option<ContentSignals> {
        self.signals.get(index).copied()
    }

    /// Replaces the whole item list. Cached heights are re-applied by id.
    pub fn set_items(&mut self, items: impl IntoIterator<Item = FeedItem<K>>) {
        self.keys.clear();
        self.signals.clear();
        self.index_by_key.clear();
        for item in items {
            self.index_by_key.insert(item.id.clone(), self.keys.len());
            self.keys.push(item.id);
            self.signals.push(item.signals);
        }
        vdebug!(count = self.keys.len(), "set_items");
        self.rebuild_sizes();
        self.notify();
    }

    /// Appends items to the end of the list (e.g. a freshly loaded page).
    ///
    /// Existing offsets are untouched; each appended row costs `O(log n)`.
    pub fn append_items(&mut self, items: impl IntoIterator<Item = FeedItem<K>>) {
        let before = self.keys.len();
        for item in items {
            let (size, measured) = self.lookup_size(&item.id, &item.signals);
            self.index_by_key.insert(item.id.clone(), self.keys.len());
            self.keys.push(item.id);
            self.signals.push(item.signals);
            self.sizes.push(size);
            self.measured.push(measured);
            self.sums.push(size);
        }
        if self.keys.len() == before {
            return;
        }
        vdebug!(
            appended = self.keys.len() - before,
            count = self.keys.len(),
            "append_items"
        );
        self.notify();
    }

    /// Drops every item. Measured heights are kept; use [`Self::clear_measurements`] too when the
    /// list identity changes.
    pub fn clear_items(&mut self) {
        if self.keys.is_empty() {
            return;
        }
        self.keys.clear();
        self.signals.clear();
        self.index_by_key.clear();
        self.rebuild_sizes();
        self.notify();
    }

    // Heights.

    pub fn heights(&self) -> &HeightCache<K> {
        &self.heights
    }

    /// Records a measured height for `id` without touching the scroll offset.
    ///
    /// Returns `Ok(true)` when the layout changed. Ids that are not (yet) in the list are cached
    /// and applied once they appear.
    pub fn try_measure(&mut self, id: K, size: u32) -> Result<bool, MeasurementError> {
        let index = self.index_of(&id);
        if !self.heights.try_set(id, size)? {
            if let Some(i) = index {
                self.measured[i] = true;
            }
            return Ok(false);
        }
        let Some(index) = index else {
            return Ok(false);
        };
        vtrace!(index, size, "measure");
        let changed = self.apply_size(index, size) != 0;
        if changed {
            self.notify();
        }
        Ok(changed)
    }

    /// Like [`Self::try_measure`], ignoring rejected sizes.
    pub fn measure(&mut self, id: K, size: u32) -> bool {
        self.try_measure(id, size).unwrap_or(false)
    }

    /// Records a measured height and keeps the content under the reader still.
    ///
    /// When the row starts above the current offset (or the adjust hook says so), the scroll
    /// offset moves by the size delta. Returns the applied offset delta.
    pub fn resize_item(&mut self, id: K, size: u32) -> Result<i64, MeasurementError> {
        let index = self.index_of(&id);
        if !self.heights.try_set(id, size)? {
            return Ok(0);
        }
        let Some(index) = index else {
            return Ok(0);
        };
        let row = self.row_unchecked(index);
        let delta = self.apply_size(index, size);
        if delta == 0 {
            return Ok(0);
        }

        let shift = match &self.options.adjust_offset_on_resize {
            Some(f) => f(self, &row, delta),
            None => row.start < self.scroll_offset,
        };

        let applied = if shift {
            if delta > 0 {
                self.scroll_offset = self.scroll_offset.saturating_add(delta as u64);
            } else {
                self.scroll_offset = self.scroll_offset.saturating_sub(delta.unsigned_abs());
            }
            delta
        } else {
            0
        };
        vtrace!(index, size, delta, applied, "resize_item");
        self.notify();
        Ok(applied)
    }

    fn apply_size(&mut self, index: usize, size: u32) -> i64 {
        let size = size.max(MIN_ITEM_SIZE);
        let cur = self.sizes[index];
        self.measured[index] = true;
        if cur == size {
            return 0;
        }
        self.sizes[index] = size;
        let delta = size as i64 - cur as i64;
        self.sums.adjust(index, delta);
        delta
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.measured.get(index).copied().unwrap_or(false)
    }

    /// Forgets every measured height and falls back to estimates.
    pub fn clear_measurements(&mut self) {
        vdebug!(cached = self.heights.len(), "clear_measurements");
        self.heights.clear();
        self.rebuild_sizes();
        self.notify();
    }

    /// Exports measured heights (id, size), e.g. to carry them across a remount of the same list.
    pub fn export_measurements(&self) -> Vec<(K, u32)> {
        self.heights.export()
    }

    /// Replaces measured heights. Zero sizes are skipped.
    pub fn import_measurements(&mut self, entries: impl IntoIterator<Item = (K, u32)>) {
        self.heights.clear();
        for (k, v) in entries {
            self.heights.set(k, v);
        }
        vdebug!(entries = self.heights.len(), "import_measurements");
        self.rebuild_sizes();
        self.notify();
    }

    fn lookup_size(&self, id: &K, signals: &ContentSignals) -> (u32, bool) {
        match self.heights.get(id) {
            Some(size) => (size.max(MIN_ITEM_SIZE), true),
            None => (
                self.options.estimator.estimate(signals).max(MIN_ITEM_SIZE),
                false,
            ),
        }
    }

    fn rebuild_sizes(&mut self) {
        self.sizes.clear();
        self.measured.clear();
        self.sizes.reserve_exact(self.keys.len());
        self.measured.reserve_exact(self.keys.len());
        for i in 0..self.keys.len() {
            let (size, measured) = self.lookup_size(&self.keys[i], &self.signals[i]);
            self.sizes.push(size);
            self.measured.push(measured);
        }
        self.sums = PrefixTable::from_sizes(&self.sizes);
    }

    // Scroll state.

    pub fn viewport_size(&self) -> u32 {
        self.viewport_size
    }

    pub fn set_viewport_size(&mut self, size: u32) {
        if self.viewport_size == size {
            return;
        }
        self.viewport_size = size;
        self.notify();
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll_direction
    }

    pub fn set_scroll_offset(&mut self, offset: u64) {
        if self.scroll_offset == offset {
            return;
        }
        let prev = self.scroll_offset;
        self.scroll_offset = offset;
        self.scroll_direction = match offset.cmp(&prev) {
            cmp::Ordering::Greater => Some(ScrollDirection::Forward),
            cmp::Ordering::Less => Some(ScrollDirection::Backward),
            cmp::Ordering::Equal => self.scroll_direction,
        };
        self.notify();
    }

    pub fn set_scroll_offset_clamped(&mut self, offset: u64) {
        let clamped = self.clamp_scroll_offset(offset);
        self.set_scroll_offset(clamped);
    }

    pub fn set_viewport_and_scroll(&mut self, viewport_size: u32, scroll_offset: u64) {
        self.batch_update(|v| {
            v.set_viewport_size(viewport_size);
            v.set_scroll_offset(scroll_offset);
        });
    }

    /// Applies a scroll offset reported by the UI and marks the virtualizer as scrolling.
    pub fn apply_scroll_offset_event(&mut self, offset: u64, now_ms: u64) {
        vtrace!(offset, now_ms, "apply_scroll_offset_event");
        self.batch_update(|v| {
            v.set_scroll_offset(offset);
            v.notify_scroll_event(now_ms);
        });
    }

    /// Puts the scroll state back to the configured initial offset (e.g. on a list switch).
    pub fn reset_scroll(&mut self) {
        self.batch_update(|v| {
            let initial = v.options.initial_offset;
            v.set_scroll_offset(initial);
            v.scroll_direction = None;
            v.set_is_scrolling(false);
        });
    }

    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    pub fn set_is_scrolling(&mut self, is_scrolling: bool) {
        if self.is_scrolling == is_scrolling {
            return;
        }
        self.is_scrolling = is_scrolling;
        if !is_scrolling {
            self.last_scroll_event_ms = None;
        }
        self.notify();
    }

    pub fn notify_scroll_event(&mut self, now_ms: u64) {
        self.last_scroll_event_ms = Some(now_ms);
        self.set_is_scrolling(true);
    }

    /// Resets `is_scrolling` once the configured quiet period has passed.
    pub fn update_scrolling(&mut self, now_ms: u64) {
        if !self.is_scrolling {
            return;
        }
        let Some(last) = self.last_scroll_event_ms else {
            return;
        };
        if now_ms.saturating_sub(last) >= self.options.scroll_idle_ms {
            self.set_is_scrolling(false);
        }
    }

    // Queries.

    pub fn total_size(&self) -> u64 {
        self.options.padding_start as u64 + self.sums.total() + self.options.padding_end as u64
    }

    pub fn max_scroll_offset(&self) -> u64 {
        self.total_size()
            .saturating_sub(self.viewport_size as u64)
    }

    pub fn clamp_scroll_offset(&self, offset: u64) -> u64 {
        offset.min(self.max_scroll_offset())
    }

    /// Rows intersecting the viewport, without overscan.
    pub fn visible_range(&self) -> VirtualRange {
        self.visible_range_for(self.scroll_offset, self.viewport_size)
    }

    pub fn visible_range_for(&self, scroll_offset: u64, viewport_size: u32) -> VirtualRange {
        let count = self.keys.len();
        if count == 0 || viewport_size == 0 {
            return VirtualRange::EMPTY;
        }

        let view = viewport_size as u64;
        let scroll_offset = scroll_offset.min(self.max_scroll_offset_for(view));
        let items_end = self.options.padding_start as u64 + self.sums.total();
        if scroll_offset >= items_end {
            return VirtualRange {
                start_index: count,
                end_index: count,
            };
        }

        let last_visible_px = scroll_offset.saturating_add(view).saturating_sub(1);
        let start = self.index_at_offset_inner(scroll_offset);
        let end = self.index_at_offset_inner(cmp::max(last_visible_px, scroll_offset)) + 1;

        VirtualRange {
            start_index: start.min(count),
            end_index: end.min(count),
        }
    }

    /// The visible range padded by overscan on both ends and clamped to the item count.
    pub fn virtual_range(&self) -> VirtualRange {
        self.virtual_range_for(self.scroll_offset, self.viewport_size)
    }

    pub fn virtual_range_for(&self, scroll_offset: u64, viewport_size: u32) -> VirtualRange {
        let mut range = self.visible_range_for(scroll_offset, viewport_size);
        if range.is_empty() {
            return range;
        }
        let overscan = self.options.overscan;
        range.start_index = range.start_index.saturating_sub(overscan);
        range.end_index = cmp::min(self.keys.len(), range.end_index.saturating_add(overscan));
        range
    }

    pub fn for_each_virtual_row(&self, f: impl FnMut(VirtualRow<K>)) {
        self.for_each_virtual_row_for(self.scroll_offset, self.viewport_size, f);
    }

    pub fn for_each_virtual_row_for(
        &self,
        scroll_offset: u64,
        viewport_size: u32,
        mut f: impl FnMut(VirtualRow<K>),
    ) {
        let range = self.virtual_range_for(scroll_offset, viewport_size);
        if range.is_empty() {
            return;
        }
        let mut start = self.start_of(range.start_index);
        for i in range.start_index..range.end_index {
            let size = self.sizes[i];
            f(VirtualRow {
                key: self.keys[i].clone(),
                index: i,
                start,
                size,
            });
            start = start.saturating_add(size as u64);
        }
    }

    /// Collects the rows to mount into `out` (clears `out` first).
    pub fn collect_virtual_rows(&self, out: &mut Vec<VirtualRow<K>>) {
        out.clear();
        self.for_each_virtual_row(|row| out.push(row));
    }

    pub fn virtual_rows(&self) -> Vec<VirtualRow<K>> {
        let mut out = Vec::with_capacity(self.virtual_range().len());
        self.collect_virtual_rows(&mut out);
        out
    }

    pub fn row(&self, index: usize) -> Option<VirtualRow<K>> {
        (index < self.keys.len()).then(|| self.row_unchecked(index))
    }

    pub fn item_start(&self, index: usize) -> Option<u64> {
        (index < self.keys.len()).then(|| self.start_of(index))
    }

    pub fn item_size(&self, index: usize) -> Option<u32> {
        self.sizes.get(index).copied()
    }

    pub fn item_end(&self, index: usize) -> Option<u64> {
        let start = self.item_start(index)?;
        Some(start.saturating_add(self.sizes[index] as u64))
    }

    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        if self.keys.is_empty() {
            return None;
        }
        Some(self.index_at_offset_inner(offset))
    }

    pub fn row_at_offset(&self, offset: u64) -> Option<VirtualRow<K>> {
        let index = self.index_at_offset(offset)?;
        Some(self.row_unchecked(index))
    }

    /// Programmatically scrolls to an index (no animation). Returns the applied offset.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        let offset = self.scroll_to_index_offset(index, align);
        self.set_scroll_offset(offset);
        offset
    }

    pub fn scroll_to_index_offset(&self, index: usize, align: Align) -> u64 {
        if self.keys.is_empty() {
            return 0;
        }
        let index = index.min(self.keys.len() - 1);
        let row = self.row_unchecked(index);
        let view = self.viewport_size as u64;

        let target = match align {
            Align::Start => row.start,
            Align::End => row.end().saturating_sub(view),
            Align::Center => {
                let center = row.start.saturating_add(row.size as u64 / 2);
                center.saturating_sub(view / 2)
            }
            Align::Auto => {
                let cur = self.scroll_offset;
                let cur_end = cur.saturating_add(view);
                if row.start >= cur && row.end() <= cur_end {
                    cur
                } else if row.start < cur {
                    row.start
                } else {
                    row.end().saturating_sub(view)
                }
            }
        };

        self.clamp_scroll_offset(target)
    }

    fn max_scroll_offset_for(&self, view: u64) -> u64 {
        self.total_size().saturating_sub(view)
    }

    fn row_unchecked(&self, index: usize) -> VirtualRow<K> {
        VirtualRow {
            key: self.keys[index].clone(),
            index,
            start: self.start_of(index),
            size: self.sizes[index],
        }
    }

    fn start_of(&self, index: usize) -> u64 {
        self.options.padding_start as u64 + self.sums.offset_of(index)
    }

    // Callers guarantee a non-empty list.
    fn index_at_offset_inner(&self, offset: u64) -> usize {
        let ps = self.options.padding_start as u64;
        if offset < ps {
            return 0;
        }
        let consumed = self.sums.rows_ending_by(offset - ps);
        consumed.min(self.keys.len().saturating_sub(1))
    }
}
