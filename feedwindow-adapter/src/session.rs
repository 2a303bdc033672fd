use alloc::vec::Vec;
use core::fmt;

use feedwindow::{
    Align, FeedItem, FeedKey, Virtualizer, VirtualizerOptions, VisibilitySnapshot,
    VisibilityTracker, size_from_px,
};

use crate::anchor::{ScrollAnchor, apply_anchor, capture_first_visible_anchor};
use crate::config::FeedConfig;
use crate::device::DeviceProfile;
use crate::generation::Generation;
use crate::infinite::{
    InfiniteScrollCoordinator, LoadSkipped, LoadTicket, NetworkStatus, ProviderState,
    sentinel_visibility,
};
use crate::key::ListKey;
use crate::position::{OffsetUpdate, ScrollPositionManager, ScrollPositionStore};

/// One row as the item renderer sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowView<K> {
    pub id: K,
    pub index: usize,
    pub start: u64,
    pub size: u32,
    pub is_visible: bool,
    pub should_preload: bool,
}

/// What changed during [`FeedSession::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameUpdate {
    /// Offset the adapter must write into the scroll container.
    pub scroll_to: Option<u64>,
    /// The committed scroll offset moved.
    pub offset_changed: bool,
    /// A new visibility snapshot was published.
    pub visibility_changed: bool,
}

/// All per-list state of one mounted feed.
///
/// Built by [`FeedSession::mount`] and disposed with [`FeedSession::unmount`]. Switching the list
/// key clears measured heights, cancels pending work and bumps the [`Generation`], so load
/// tickets issued for the previous list no longer release anything.
pub struct FeedSession<K> {
    list_key: ListKey,
    generation: Generation,
    config: FeedConfig,
    device: DeviceProfile,
    virtualizer: Virtualizer<K>,
    tracker: VisibilityTracker<K>,
    position: ScrollPositionManager,
    loader: InfiniteScrollCoordinator,
    scroll_request: Option<u64>,
}

impl<K: FeedKey + fmt::Debug> fmt::Debug for FeedSession<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedSession")
            .field("list_key", &self.list_key)
            .field("generation", &self.generation)
            .field("count", &self.virtualizer.count())
            .field("offset", &self.position.offset())
            .field("scroll_request", &self.scroll_request)
            .finish_non_exhaustive()
    }
}

impl<K: FeedKey> FeedSession<K> {
    /// Mounts a feed and restores its saved scroll position, if any.
    ///
    /// A restored offset is available right away from [`Self::take_scroll_request`] (and from the
    /// next [`Self::tick`] otherwise).
    pub fn mount(
        list_key: impl Into<ListKey>,
        config: FeedConfig,
        device: DeviceProfile,
        store: &ScrollPositionStore,
        now_ms: u64,
    ) -> Self {
        let list_key = list_key.into();
        let generation = Generation::INITIAL;
        let options = VirtualizerOptions::new(device.estimator())
            .with_overscan(device.overscan())
            .with_scroll_idle_ms(config.scroll_idle_ms);

        let mut session = Self {
            virtualizer: Virtualizer::new(options),
            tracker: VisibilityTracker::new(config.tracker_options()),
            position: ScrollPositionManager::new(
                list_key.clone(),
                &config,
                device.prefers_reduced_motion,
            ),
            loader: InfiniteScrollCoordinator::new(
                config.intersection_threshold,
                config.cooldown_ms,
                generation,
            ),
            list_key,
            generation,
            config,
            device,
            scroll_request: None,
        };
        adebug!(
            list_key = %session.list_key,
            overscan = session.device.overscan(),
            "mount feed"
        );
        if let Some(offset) = session.position.restore(store) {
            let update = session.position.jump_to(offset, now_ms);
            session.apply_offset(update, now_ms);
        }
        session
    }

    /// Saves the scroll position and disposes the session.
    pub fn unmount(mut self, store: &mut ScrollPositionStore) {
        self.tracker.cancel();
        self.position.set_total_size(self.virtualizer.total_size());
        self.position.save(store);
        adebug!(list_key = %self.list_key, "unmount feed");
    }

    pub fn list_key(&self) -> &ListKey {
        &self.list_key
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn device(&self) -> &DeviceProfile {
        &self.device
    }

    pub fn virtualizer(&self) -> &Virtualizer<K> {
        &self.virtualizer
    }

    pub fn tracker(&self) -> &VisibilityTracker<K> {
        &self.tracker
    }

    pub fn position(&self) -> &ScrollPositionManager {
        &self.position
    }

    pub fn loader(&self) -> &InfiniteScrollCoordinator {
        &self.loader
    }

    pub fn set_on_visibility_change(
        &mut self,
        on_change: Option<impl Fn(&VisibilitySnapshot<K>) + Send + Sync + 'static>,
    ) {
        self.tracker.set_on_change(on_change);
    }

    // Layout inputs.

    pub fn set_viewport_size(&mut self, size: u32, now_ms: u64) {
        if self.virtualizer.viewport_size() == size {
            return;
        }
        self.virtualizer.set_viewport_size(size);
        self.tracker.invalidate(now_ms);
    }

    pub fn set_items(&mut self, items: impl IntoIterator<Item = FeedItem<K>>, now_ms: u64) {
        self.virtualizer.set_items(items);
        self.layout_changed(now_ms);
    }

    /// Appends a loaded page.
    pub fn append_items(&mut self, items: impl IntoIterator<Item = FeedItem<K>>, now_ms: u64) {
        self.virtualizer.append_items(items);
        self.layout_changed(now_ms);
    }

    /// Inserts newer posts above the current ones without moving the post under the reader.
    pub fn prepend_items(&mut self, items: impl IntoIterator<Item = FeedItem<K>>, now_ms: u64) {
        let anchor = self.capture_anchor();
        let existing: Vec<FeedItem<K>> = (0..self.virtualizer.count())
            .filter_map(|i| {
                let id = self.virtualizer.key_for(i)?.clone();
                let signals = self.virtualizer.signals_for(i)?;
                Some(FeedItem::new(id, signals))
            })
            .collect();
        self.virtualizer.set_items(items.into_iter().chain(existing));
        if let Some(anchor) = anchor {
            self.restore_anchor(&anchor, now_ms);
        }
        self.layout_changed(now_ms);
    }

    /// The only write path for measured heights.
    ///
    /// Rejected measurements (non-finite, zero or negative) are logged and ignored. Returns
    /// `true` when the layout changed. Growth above the viewport moves the offset by the same
    /// amount; that offset is then reported through `scroll_to`.
    pub fn report_measured_height(&mut self, id: K, px: f64, now_ms: u64) -> bool {
        let size = match size_from_px(px) {
            Ok(size) => size,
            Err(_err) => {
                adebug!(error = %_err, "measured height rejected");
                return false;
            }
        };
        let before = self
            .virtualizer
            .index_of(&id)
            .and_then(|i| self.virtualizer.item_size(i));

        // The shift must apply to the newest offset, not the last throttled commit.
        if let Some(update) = self.position.flush_pending(now_ms) {
            self.apply_offset(update, now_ms);
        }
        let delta = match self.virtualizer.resize_item(id, size) {
            Ok(delta) => delta,
            Err(_err) => {
                adebug!(error = %_err, "measured height rejected");
                return false;
            }
        };
        if delta != 0 {
            let update = self
                .position
                .follow_layout(self.virtualizer.scroll_offset(), now_ms);
            self.apply_offset(update, now_ms);
        }

        let changed = before.is_some_and(|b| b != size);
        if changed {
            self.layout_changed(now_ms);
        }
        changed
    }

    // Scrolling.

    /// A scroll event from the container.
    pub fn on_scroll(&mut self, offset: u64, now_ms: u64) {
        if let Some(update) = self.position.on_scroll(offset, now_ms) {
            self.apply_offset(update, now_ms);
        }
    }

    /// Per-frame driver: flushes throttled captures, advances animations and publishes
    /// visibility once the debounce has elapsed.
    pub fn tick(&mut self, now_ms: u64) -> FrameUpdate {
        let mut frame = FrameUpdate::default();
        if let Some(update) = self.position.tick(now_ms) {
            self.apply_offset(update, now_ms);
            frame.offset_changed = true;
        }
        self.virtualizer.update_scrolling(now_ms);
        frame.visibility_changed = self.tracker.tick(now_ms, &self.virtualizer);
        frame.scroll_to = self.scroll_request.take();
        frame
    }

    /// Offset the adapter still has to write into the container, if any.
    pub fn take_scroll_request(&mut self) -> Option<u64> {
        self.scroll_request.take()
    }

    pub fn offset(&self) -> u64 {
        self.position.offset()
    }

    pub fn total_size(&self) -> u64 {
        self.virtualizer.total_size()
    }

    /// Scrolls back to the first post.
    ///
    /// With reduced motion the jump happens now and `Some(0)` is returned; otherwise the
    /// animation is driven by [`Self::tick`].
    pub fn scroll_to_top(&mut self, now_ms: u64) -> Option<u64> {
        let update = self.position.scroll_to_top(now_ms)?;
        self.apply_offset(update, now_ms);
        self.scroll_request.take()
    }

    pub fn show_scroll_to_top_button(&self) -> bool {
        self.position.show_scroll_to_top_button()
    }

    /// Jumps to an item. Returns the applied offset.
    pub fn scroll_to_index(&mut self, index: usize, align: Align, now_ms: u64) -> u64 {
        let offset = self.virtualizer.scroll_to_index_offset(index, align);
        let update = self.position.jump_to(offset, now_ms);
        self.apply_offset(update, now_ms);
        offset
    }

    // Rows.

    pub fn for_each_row(&self, mut f: impl FnMut(RowView<K>)) {
        self.virtualizer.for_each_virtual_row(|row| {
            f(RowView {
                is_visible: self.tracker.is_visible(&row.key),
                should_preload: self.tracker.should_preload(&row.key),
                id: row.key,
                index: row.index,
                start: row.start,
                size: row.size,
            });
        });
    }

    /// Rows to mount, with their visibility flags from the last published snapshot.
    pub fn rows(&self) -> Vec<RowView<K>> {
        let mut out = Vec::with_capacity(self.virtualizer.virtual_range().len());
        self.for_each_row(|row| out.push(row));
        out
    }

    // Infinite scroll.

    /// Reacts to the host's intersection observer reporting the sentinel's visibility.
    pub fn on_sentinel_intersection(
        &mut self,
        ratio: f32,
        provider: ProviderState,
        network: NetworkStatus,
        now_ms: u64,
    ) -> Result<LoadTicket, LoadSkipped> {
        self.loader.on_intersection(ratio, provider, network, now_ms)
    }

    /// Like [`Self::on_sentinel_intersection`], with the ratio derived from the current layout.
    pub fn check_load_more(
        &mut self,
        provider: ProviderState,
        network: NetworkStatus,
        now_ms: u64,
    ) -> Result<LoadTicket, LoadSkipped> {
        let ratio = sentinel_visibility(
            self.virtualizer.total_size(),
            self.position.offset(),
            self.virtualizer.viewport_size(),
            self.config.sentinel_size,
            self.config.sentinel_root_margin,
        );
        self.on_sentinel_intersection(ratio, provider, network, now_ms)
    }

    /// Settles a load and returns its result unmodified.
    pub fn finish_load<E>(&mut self, ticket: LoadTicket, result: Result<(), E>) -> Result<(), E> {
        self.loader.finish(ticket, result)
    }

    // List identity.

    /// Switches to another feed. The current position is saved, heights are dropped and the
    /// new feed's position (or the top) is requested.
    pub fn switch_list(
        &mut self,
        list_key: impl Into<ListKey>,
        store: &mut ScrollPositionStore,
        now_ms: u64,
    ) {
        let list_key = list_key.into();
        if list_key == self.list_key {
            return;
        }
        self.position.set_total_size(self.virtualizer.total_size());
        self.position.save(store);

        self.generation = self.generation.next();
        adebug!(
            from = %self.list_key,
            to = %list_key,
            generation = self.generation.get(),
            "switch list"
        );
        self.loader.reset(self.generation);
        self.tracker.reset();
        self.virtualizer.batch_update(|v| {
            v.clear_items();
            v.clear_measurements();
            v.reset_scroll();
        });
        self.position.reset(list_key.clone());
        self.list_key = list_key;
        self.scroll_request = None;

        let offset = self.position.restore(store).unwrap_or(0);
        let update = self.position.jump_to(offset, now_ms);
        self.apply_offset(update, now_ms);
    }

    // Anchoring.

    pub fn capture_anchor(&self) -> Option<ScrollAnchor<K>> {
        capture_first_visible_anchor(&self.virtualizer)
    }

    /// Scrolls so `anchor` sits where it was captured. Returns `false` if its post is gone.
    pub fn restore_anchor(&mut self, anchor: &ScrollAnchor<K>, now_ms: u64) -> bool {
        if !apply_anchor(&mut self.virtualizer, anchor) {
            return false;
        }
        let update = self
            .position
            .jump_to(self.virtualizer.scroll_offset(), now_ms);
        self.apply_offset(update, now_ms);
        true
    }

    fn apply_offset(&mut self, update: OffsetUpdate, now_ms: u64) {
        let offset = update.offset();
        match update {
            OffsetUpdate::Captured(_) => {
                self.virtualizer.apply_scroll_offset_event(offset, now_ms);
            }
            OffsetUpdate::Programmatic(_) => {
                self.virtualizer.set_scroll_offset(offset);
                self.scroll_request = Some(offset);
            }
        }
        self.tracker.on_scroll(offset, now_ms);
    }

    fn layout_changed(&mut self, now_ms: u64) {
        self.position.set_total_size(self.virtualizer.total_size());
        self.tracker.invalidate(now_ms);
    }
}
