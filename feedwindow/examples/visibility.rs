// Example: debounced visible/preload sets that follow the scroll direction.
use feedwindow::{
    ContentSignals, FeedItem, TrackerOptions, Virtualizer, VirtualizerOptions, VisibilityTracker,
};

fn main() {
    let mut v = Virtualizer::new(VirtualizerOptions::default());
    v.set_items((0..50u64).map(|id| FeedItem::new(id, ContentSignals::text(40))));
    v.set_viewport_size(800);

    let mut tracker = VisibilityTracker::new(TrackerOptions::default()).with_on_change(Some(
        |snapshot: &feedwindow::VisibilitySnapshot<u64>| {
            println!(
                "published visible={:?} preload={:?}",
                snapshot.visible_range, snapshot.preload_range
            );
        },
    ));

    // A burst of scroll events collapses into one recompute after the quiet period.
    for (now_ms, offset) in [(0u64, 0u64), (10, 400), (20, 900), (30, 1500)] {
        v.apply_scroll_offset_event(offset, now_ms);
        tracker.on_scroll(offset, now_ms);
        tracker.tick(now_ms, &v);
    }
    tracker.tick(80, &v);

    // Scrolling back flips the preload window above the viewport.
    v.apply_scroll_offset_event(1000, 200);
    tracker.on_scroll(1000, 200);
    tracker.tick(250, &v);
    println!("direction={:?} revision={}", tracker.direction(), tracker.revision());
}
