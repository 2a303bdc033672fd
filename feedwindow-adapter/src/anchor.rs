use core::fmt;

use feedwindow::{FeedKey, Virtualizer};

/// A scroll anchor that keeps the reader on the same post across list changes.
///
/// Typical use: new posts are inserted above ("show 12 new posts") and the viewport must not
/// jump.
#[derive(Clone, PartialEq, Eq)]
pub struct ScrollAnchor<K> {
    pub id: K,
    /// Distance from the anchored row's start to the scroll offset.
    pub offset_in_row: u64,
}

impl<K: fmt::Debug> fmt::Debug for ScrollAnchor<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollAnchor")
            .field("id", &self.id)
            .field("offset_in_row", &self.offset_in_row)
            .finish()
    }
}

/// Captures an anchor on the first visible row.
///
/// Returns `None` when nothing is visible.
pub fn capture_first_visible_anchor<K: FeedKey>(v: &Virtualizer<K>) -> Option<ScrollAnchor<K>> {
    let visible = v.visible_range();
    if visible.is_empty() {
        return None;
    }
    let row = v.row(visible.start_index)?;
    Some(ScrollAnchor {
        offset_in_row: v.scroll_offset().saturating_sub(row.start),
        id: row.key,
    })
}

/// Moves the scroll offset so the anchored post sits where it was captured.
///
/// Returns `false` when the anchored id is no longer in the list.
pub fn apply_anchor<K: FeedKey>(v: &mut Virtualizer<K>, anchor: &ScrollAnchor<K>) -> bool {
    let Some(index) = v.index_of(&anchor.id) else {
        return false;
    };
    let Some(start) = v.item_start(index) else {
        return false;
    };
    v.set_scroll_offset_clamped(start.saturating_add(anchor.offset_in_row));
    true
}
