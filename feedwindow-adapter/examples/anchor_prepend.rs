// Example: "show new posts" inserts above the reader without moving them.
use feedwindow::{ContentSignals, FeedItem};
use feedwindow_adapter::{DeviceProfile, FeedConfig, FeedSession, ScrollPositionStore};

fn main() {
    let store = ScrollPositionStore::new();
    let mut s = FeedSession::mount(
        "home",
        FeedConfig::default(),
        DeviceProfile::default(),
        &store,
        0,
    );
    s.set_viewport_size(800, 0);
    s.set_items(
        (100..200u64).map(|id| FeedItem::new(id, ContentSignals::text(120))),
        0,
    );
    s.on_scroll(1_000, 0);
    println!("before: offset={} anchor={:?}", s.offset(), s.capture_anchor());

    s.prepend_items(
        (0..12u64).map(|id| FeedItem::new(id, ContentSignals::text(40).with_image(id % 3 == 0))),
        16,
    );
    println!(
        "after: offset={} anchor={:?} write={:?}",
        s.offset(),
        s.capture_anchor(),
        s.take_scroll_request()
    );
}
