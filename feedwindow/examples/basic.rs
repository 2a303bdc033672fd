// Example: a long feed with estimated heights; only a handful of rows are mounted.
use feedwindow::{Align, ContentSignals, FeedItem, Virtualizer, VirtualizerOptions};

fn main() {
    let mut v = Virtualizer::new(VirtualizerOptions::default().with_overscan(3));
    v.set_items((0..100_000u64).map(|id| {
        let signals = ContentSignals::text((id % 600) as usize).with_image(id % 4 == 0);
        FeedItem::new(id, signals)
    }));
    v.set_viewport_and_scroll(800, 1_234_567);

    let rows = v.virtual_rows();
    println!("total_size={}", v.total_size());
    println!("visible_range={:?}", v.visible_range());
    println!("mounted={} first={:?}", rows.len(), rows.first());

    let off = v.scroll_to_index_offset(99_999, Align::End);
    v.set_scroll_offset_clamped(off);
    println!("after scroll_to_index: offset={}", v.scroll_offset());
}
