// Example: a mounted feed driven frame by frame, with infinite scroll and position restore.
use feedwindow::{ContentSignals, FeedItem};
use feedwindow_adapter::{
    DeviceProfile, FeedConfig, FeedSession, NetworkStatus, ProviderState, ScrollPositionStore,
};

fn page(start: u64, len: u64) -> impl Iterator<Item = FeedItem<u64>> {
    (start..start + len).map(|id| FeedItem::new(id, ContentSignals::text((id * 37 % 700) as usize)))
}

fn main() {
    let mut store = ScrollPositionStore::new();
    let device = DeviceProfile::new(390, 6);
    let mut session = FeedSession::mount("home", FeedConfig::default(), device, &store, 0);
    session.set_viewport_size(700, 0);
    session.append_items(page(0, 20), 0);

    let mut loaded = 20u64;
    let mut offset = 0u64;
    for frame in 0..240u64 {
        let now_ms = frame * 16;
        offset += 45;
        session.on_scroll(offset, now_ms);

        let provider = ProviderState {
            has_more: loaded < 100,
            is_loading: false,
        };
        if let Ok(ticket) = session.check_load_more(provider, NetworkStatus::Online, now_ms) {
            // The caller runs its own `loadMore`; here the page arrives immediately.
            session.append_items(page(loaded, 20), now_ms);
            loaded += 20;
            let result: Result<(), &str> = Ok(());
            if let Err(err) = session.finish_load(ticket, result) {
                println!("load failed: {err}");
            }
        }

        let update = session.tick(now_ms);
        if update.visibility_changed {
            let rows = session.rows();
            let visible = rows.iter().filter(|r| r.is_visible).count();
            println!(
                "t={now_ms}ms offset={} mounted={} visible={visible} loaded={loaded}",
                session.offset(),
                rows.len()
            );
        }
    }

    session.unmount(&mut store);

    let session = FeedSession::<u64>::mount("home", FeedConfig::default(), device, &store, 5_000);
    println!("restored offset={}", session.offset());
}
