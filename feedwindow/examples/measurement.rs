// Example: measured heights replace estimates, and growth above the viewport keeps content still.
use feedwindow::{ContentSignals, FeedItem, Virtualizer, VirtualizerOptions, size_from_px};

fn main() {
    let mut v = Virtualizer::new(VirtualizerOptions::default());
    v.set_items([
        FeedItem::new("short", ContentSignals::text(40)),
        FeedItem::new("photo", ContentSignals::text(20).with_image(true)),
        FeedItem::new("clip", ContentSignals::scan("https://youtu.be/abc", false)),
    ]);
    v.set_viewport_and_scroll(400, 600);
    println!(
        "estimated: sizes={:?} total={}",
        (0..v.count()).map(|i| v.item_size(i)).collect::<Vec<_>>(),
        v.total_size()
    );

    // The renderer reports a fractional height; it is rounded up.
    match size_from_px(512.4) {
        Ok(size) => {
            let applied = v.resize_item("photo", size).unwrap_or(0);
            println!(
                "resize photo: applied_delta={applied} offset={} total={}",
                v.scroll_offset(),
                v.total_size()
            );
        }
        Err(err) => println!("rejected: {err}"),
    }

    // Rejected measurements leave the layout alone.
    if let Err(err) = size_from_px(f64::NAN) {
        println!("rejected: {err}");
    }

    let exported = v.export_measurements();
    println!("measured entries={exported:?}");
}
