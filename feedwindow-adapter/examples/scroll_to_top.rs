// Example: scroll-to-top animates, or jumps when reduced motion is preferred.
use feedwindow_adapter::{DeviceProfile, FeedConfig, FeedSession, ScrollPositionStore};

fn main() {
    let store = ScrollPositionStore::new();
    for reduced_motion in [false, true] {
        let device = DeviceProfile::default().with_reduced_motion(reduced_motion);
        let mut s = FeedSession::<u64>::mount("home", FeedConfig::default(), device, &store, 0);
        s.on_scroll(5_000, 0);
        println!(
            "reduced_motion={reduced_motion} show_button={}",
            s.show_scroll_to_top_button()
        );

        if let Some(offset) = s.scroll_to_top(100) {
            println!("  jump to {offset}");
            continue;
        }
        let mut now_ms = 100;
        while s.position().is_animating() {
            now_ms += 16;
            if let Some(offset) = s.tick(now_ms).scroll_to {
                println!("  t={now_ms}ms write {offset}");
            }
        }
    }
}
