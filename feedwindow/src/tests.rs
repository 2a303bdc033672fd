use crate::prefix::PrefixTable;
use crate::*;

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        start + (self.next_u64() % (end_exclusive - start))
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }

    fn gen_range_u32(&mut self, start: u32, end_exclusive: u32) -> u32 {
        self.gen_range_u64(start as u64, end_exclusive as u64) as u32
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }

    fn signals(&mut self) -> ContentSignals {
        ContentSignals::text(self.gen_range_usize(0, 900))
            .with_image(self.gen_bool())
            .with_video(self.gen_range_u32(0, 4) == 0)
    }
}

fn short_posts(n: usize) -> impl DoubleEndedIterator<Item = FeedItem<u64>> {
    (0..n as u64).map(|id| FeedItem::new(id, ContentSignals::text(40)))
}

fn smallest_row(v: &Virtualizer<u64>) -> u32 {
    (0..v.count())
        .filter_map(|i| v.item_size(i))
        .min()
        .unwrap_or(1)
}

fn feed(n: usize, overscan: usize) -> Virtualizer<u64> {
    let mut v = Virtualizer::new(VirtualizerOptions::default().with_overscan(overscan));
    v.set_items(short_posts(n));
    v
}

fn expected_visible_range(sizes: &[u32], offset: u64, viewport: u32) -> VirtualRange {
    if sizes.is_empty() || viewport == 0 {
        return VirtualRange::EMPTY;
    }
    let total: u64 = sizes.iter().map(|&s| s as u64).sum();
    let offset = offset.min(total.saturating_sub(viewport as u64));
    let end = offset + viewport as u64;
    let mut start_index = None;
    let mut end_index = 0;
    let mut at = 0u64;
    for (i, &s) in sizes.iter().enumerate() {
        let row_end = at + s as u64;
        if row_end > offset && at < end {
            start_index.get_or_insert(i);
            end_index = i + 1;
        }
        at = row_end;
    }
    VirtualRange {
        start_index: start_index.unwrap_or(sizes.len()),
        end_index,
    }
}

#[test]
fn estimator_adds_terms_for_content_signals() {
    let wide = HeightEstimator::new(ViewportClass::Wide);
    assert_eq!(wide.estimate(&ContentSignals::text(10)), 180);
    assert_eq!(wide.estimate(&ContentSignals::text(281)), 240);
    assert_eq!(wide.estimate(&ContentSignals::text(501)), 280);
    assert_eq!(wide.estimate(&ContentSignals::text(10).with_image(true)), 480);
    assert_eq!(wide.estimate(&ContentSignals::text(10).with_video(true)), 530);
    assert_eq!(
        wide.estimate(&ContentSignals::text(600).with_image(true).with_video(true)),
        180 + 60 + 40 + 300 + 350
    );

    let narrow = HeightEstimator::new(ViewportClass::Narrow);
    assert_eq!(narrow.estimate(&ContentSignals::text(10)), 230);
    assert_eq!(narrow.min_estimate(), 230);
}

#[test]
fn scan_detects_video_embeds_case_insensitively() {
    let s = ContentSignals::scan("watch this https://YouTu.be/abc123", false);
    assert!(s.has_video);
    assert_eq!(s.text_len, 34);

    assert!(ContentSignals::scan("clip: https://cdn.example/x.MP4", true).has_video);
    assert!(!ContentSignals::scan("just text about youtube", false).has_video);
    // Chars, not bytes.
    assert_eq!(ContentSignals::scan("ñandú", false).text_len, 5);
}

#[test]
fn size_from_px_rejects_non_positive_and_rounds_up() {
    assert_eq!(size_from_px(240.0), Ok(240));
    assert_eq!(size_from_px(239.2), Ok(240));
    assert_eq!(size_from_px(0.3), Ok(1));
    assert!(matches!(
        size_from_px(0.0),
        Err(MeasurementError::Invalid(_))
    ));
    assert!(size_from_px(-12.0).is_err());
    assert!(size_from_px(f64::NAN).is_err());
    assert!(size_from_px(f64::INFINITY).is_err());
}

#[test]
fn height_cache_writes_only_on_change() {
    let mut cache = HeightCache::<u64>::new();
    assert_eq!(cache.get(&1), None);
    assert_eq!(cache.try_set(1, 240), Ok(true));
    assert_eq!(cache.try_set(1, 240), Ok(false));
    assert_eq!(cache.try_set(1, 0), Err(MeasurementError::Zero));
    assert_eq!(cache.get(&1), Some(240));
    assert!(cache.set(1, 250));
    assert_eq!(cache.get(&1), Some(250));

    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn fixed_estimates_range_and_total() {
    let mut v = feed(20, 3);
    v.set_viewport_size(800);
    assert_eq!(v.total_size(), 20 * 180);

    // 800 / 180 => rows 0..=4 intersect the viewport.
    assert_eq!(
        v.visible_range(),
        VirtualRange {
            start_index: 0,
            end_index: 5
        }
    );
    assert_eq!(
        v.virtual_range(),
        VirtualRange {
            start_index: 0,
            end_index: 8
        }
    );

    v.set_scroll_offset(1000);
    assert_eq!(
        v.visible_range(),
        VirtualRange {
            start_index: 5,
            end_index: 10
        }
    );
    assert_eq!(
        v.virtual_range(),
        VirtualRange {
            start_index: 2,
            end_index: 13
        }
    );
}

#[test]
fn empty_feed_has_empty_window() {
    let mut v = Virtualizer::<u64>::new(VirtualizerOptions::default());
    v.set_viewport_and_scroll(800, 400);
    assert_eq!(v.total_size(), 0);
    assert!(v.virtual_range().is_empty());
    assert!(v.virtual_rows().is_empty());
    assert_eq!(v.index_at_offset(0), None);
    assert_eq!(v.scroll_to_index_offset(10, Align::Start), 0);
}

#[test]
fn rendered_row_count_is_independent_of_feed_length() {
    let overscan = 3;
    let viewport = 800u32;

    let mut small = feed(10, overscan);
    small.set_viewport_size(viewport);
    let mut large = feed(100_000, overscan);
    large.set_viewport_size(viewport);

    assert_eq!(small.virtual_rows().len(), large.virtual_rows().len());

    let bound = viewport.div_ceil(smallest_row(&large)) as usize + 1 + 2 * overscan;
    for offset in [0u64, 17, 90_000, 9_000_000, 17_999_100, u64::MAX] {
        large.set_scroll_offset(offset);
        let rows = large.virtual_rows();
        assert!(!rows.is_empty());
        assert!(rows.len() <= bound, "offset={offset} rows={}", rows.len());
    }
}

#[test]
fn row_bound_holds_for_mixed_heights() {
    let mut rng = Lcg::new(7);
    for _ in 0..50 {
        let n = rng.gen_range_usize(1, 400);
        let overscan = rng.gen_range_usize(0, 6);
        let mut v = Virtualizer::new(VirtualizerOptions::default().with_overscan(overscan));
        let items: Vec<_> = (0..n as u64)
            .map(|id| FeedItem::new(id, rng.signals()))
            .collect();
        v.set_items(items);
        let viewport = rng.gen_range_u32(1, 2000);
        v.set_viewport_size(viewport);
        v.set_scroll_offset(rng.gen_range_u64(0, v.total_size() + 1));

        let bound = viewport.div_ceil(smallest_row(&v)) as usize + 1 + 2 * overscan;
        assert!(v.virtual_rows().len() <= bound);
    }
}

#[test]
fn identical_inputs_yield_identical_rows() {
    let build = || {
        let mut v = Virtualizer::new(VirtualizerOptions::default().with_overscan(2));
        let mut rng = Lcg::new(99);
        let items: Vec<_> = (0..500u64)
            .map(|id| FeedItem::new(id, rng.signals()))
            .collect();
        v.set_items(items);
        v.measure(3, 222);
        v.measure(250, 999);
        v.set_viewport_and_scroll(700, 40_000);
        v
    };
    let a = build();
    let b = build();
    assert_eq!(a.virtual_rows(), b.virtual_rows());
    assert_eq!(a.virtual_rows(), a.virtual_rows());
    assert_eq!(a.total_size(), b.total_size());
}

#[test]
fn rows_match_naive_layout_for_random_feeds() {
    let mut rng = Lcg::new(0xfeed);
    for _ in 0..100 {
        let n = rng.gen_range_usize(0, 200);
        let mut v = Virtualizer::new(VirtualizerOptions::default().with_overscan(0));
        let items: Vec<_> = (0..n as u64)
            .map(|id| FeedItem::new(id, rng.signals()))
            .collect();
        v.set_items(items);
        for _ in 0..rng.gen_range_usize(0, 20) {
            if n == 0 {
                break;
            }
            let id = rng.gen_range_u64(0, n as u64);
            v.measure(id, rng.gen_range_u32(1, 900));
        }

        let sizes: Vec<u32> = (0..n).map(|i| v.item_size(i).unwrap_or(0)).collect();
        let viewport = rng.gen_range_u32(0, 1500);
        let offset = rng.gen_range_u64(0, v.total_size() + 500);
        v.set_viewport_and_scroll(viewport, offset);

        assert_eq!(
            v.visible_range(),
            expected_visible_range(&sizes, offset, viewport),
            "n={n} viewport={viewport} offset={offset}"
        );

        let mut at = 0u64;
        for (i, &s) in sizes.iter().enumerate() {
            assert_eq!(v.item_start(i), Some(at));
            at += s as u64;
        }
        assert_eq!(v.total_size(), at);
    }
}

#[test]
fn measured_height_overrides_estimate_until_cleared() {
    let mut v = feed(5, 1);
    assert_eq!(v.item_size(2), Some(180));
    assert!(v.measure(2, 240));
    assert_eq!(v.item_size(2), Some(240));
    assert!(v.is_measured(2));

    // A different estimator does not touch measured rows.
    v.update_options(|o| o.estimator = HeightEstimator::new(ViewportClass::Narrow));
    assert_eq!(v.item_size(1), Some(230));
    assert_eq!(v.item_size(2), Some(240));

    // Neither does growing or replacing the list.
    v.append_items(short_posts(10).skip(5));
    assert_eq!(v.item_size(2), Some(240));
    v.set_items(short_posts(10).rev());
    assert_eq!(v.index_of(&2), Some(7));
    assert_eq!(v.item_size(7), Some(240));

    v.clear_measurements();
    assert_eq!(v.item_size(7), Some(230));
    assert!(!v.is_measured(7));
}

#[test]
fn rejected_measurement_keeps_previous_size() {
    let mut v = feed(3, 1);
    v.measure(1, 300);
    assert_eq!(v.try_measure(1, 0), Err(MeasurementError::Zero));
    assert_eq!(v.item_size(1), Some(300));
    assert_eq!(v.try_measure(1, 300), Ok(false));
}

#[test]
fn measurement_for_unknown_id_applies_when_item_arrives() {
    let mut v = feed(2, 1);
    assert_eq!(v.try_measure(42, 512), Ok(false));
    assert_eq!(v.total_size(), 360);

    v.append_items([FeedItem::new(42, ContentSignals::text(1))]);
    assert_eq!(v.item_size(2), Some(512));
    assert!(v.is_measured(2));
    assert_eq!(v.total_size(), 360 + 512);
}

#[test]
fn append_matches_full_rebuild() {
    let mut rng = Lcg::new(3);
    let items: Vec<_> = (0..300u64)
        .map(|id| FeedItem::new(id, rng.signals()))
        .collect();

    let mut appended = Virtualizer::new(VirtualizerOptions::default());
    let mut rebuilt = Virtualizer::new(VirtualizerOptions::default());
    let mut taken = 0;
    while taken < items.len() {
        let page = rng.gen_range_usize(1, 40).min(items.len() - taken);
        appended.append_items(items[taken..taken + page].iter().cloned());
        taken += page;
        rebuilt.set_items(items[..taken].iter().cloned());

        let id = rng.gen_range_u64(0, taken as u64);
        let size = rng.gen_range_u32(1, 1200);
        appended.measure(id, size);
        rebuilt.measure(id, size);

        assert_eq!(appended.total_size(), rebuilt.total_size());
        for i in 0..taken {
            assert_eq!(appended.item_start(i), rebuilt.item_start(i));
        }
    }
}

#[test]
fn three_post_scenario_uses_estimates_then_measurement() {
    let mut v = Virtualizer::new(VirtualizerOptions::default().with_overscan(1));
    v.set_items([
        FeedItem::new(1u64, ContentSignals::text(60)),
        FeedItem::new(2, ContentSignals::text(60).with_image(true)),
        FeedItem::new(3, ContentSignals::text(300).with_video(true)),
    ]);
    v.set_viewport_size(800);

    let sizes: Vec<u32> = v.virtual_rows().iter().map(|r| r.size).collect();
    assert_eq!(sizes, [180, 480, 590]);
    assert_eq!(v.total_size(), 1250);

    v.measure(2, 500);
    let rows = v.virtual_rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1].size, 500);
    assert_eq!(rows[2].start, 680);
    assert_eq!(v.total_size(), 1270);
}

#[test]
fn resize_above_viewport_shifts_offset() {
    let mut v = feed(50, 1);
    v.set_viewport_and_scroll(800, 1800);

    // Row 0 is above the viewport: content must not jump.
    assert_eq!(v.resize_item(0, 280), Ok(100));
    assert_eq!(v.scroll_offset(), 1900);

    // Row 12 is inside the viewport: offset stays.
    assert_eq!(v.resize_item(12, 100), Ok(0));
    assert_eq!(v.scroll_offset(), 1900);

    // Same size again is a no-op.
    assert_eq!(v.resize_item(0, 280), Ok(0));
    assert!(v.resize_item(0, 0).is_err());
}

#[test]
fn adjust_hook_can_disable_scroll_shift() {
    let opts = VirtualizerOptions::default().with_adjust_offset_on_resize(
        Some(|_: &Virtualizer<u64>, _: &VirtualRow<u64>, _: i64| false),
    );
    let mut v = Virtualizer::new(opts);
    v.set_items(short_posts(20));
    v.set_viewport_and_scroll(400, 1000);
    assert_eq!(v.resize_item(0, 400), Ok(0));
    assert_eq!(v.scroll_offset(), 1000);
}

#[test]
fn padding_offsets_rows_and_total() {
    let mut v = Virtualizer::new(VirtualizerOptions::default().with_padding(64, 120));
    v.set_items(short_posts(3));
    v.set_viewport_size(100);
    assert_eq!(v.total_size(), 64 + 540 + 120);
    assert_eq!(v.item_start(0), Some(64));
    assert_eq!(v.index_at_offset(10), Some(0));
    assert_eq!(v.index_at_offset(64 + 180), Some(1));

    // Scrolled into the trailing padding: nothing visible.
    v.set_scroll_offset(64 + 540);
    assert!(v.visible_range().is_empty());
}

#[test]
fn scroll_to_index_offset_aligns_and_clamps() {
    let mut v = feed(10, 1);
    v.set_viewport_size(400);
    assert_eq!(v.scroll_to_index_offset(3, Align::Start), 540);
    assert_eq!(v.scroll_to_index_offset(3, Align::End), 720 - 400);
    assert_eq!(v.scroll_to_index_offset(3, Align::Center), 630 - 200);
    assert_eq!(v.scroll_to_index_offset(99, Align::Start), 1800 - 400);

    v.set_scroll_offset(500);
    assert_eq!(v.scroll_to_index_offset(3, Align::Auto), 500);
    assert_eq!(v.scroll_to_index(0, Align::Auto), 0);
}

#[test]
fn scroll_direction_and_is_scrolling_debounce() {
    let mut v = feed(100, 1);
    v.set_viewport_size(800);
    assert_eq!(v.scroll_direction(), None);

    v.apply_scroll_offset_event(500, 0);
    assert_eq!(v.scroll_direction(), Some(ScrollDirection::Forward));
    assert!(v.is_scrolling());

    v.apply_scroll_offset_event(200, 50);
    assert_eq!(v.scroll_direction(), Some(ScrollDirection::Backward));

    v.update_scrolling(100);
    assert!(v.is_scrolling());
    v.update_scrolling(200);
    assert!(!v.is_scrolling());

    v.reset_scroll();
    assert_eq!(v.scroll_offset(), 0);
    assert_eq!(v.scroll_direction(), None);
}

#[test]
fn batch_update_coalesces_notifications() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let opts = VirtualizerOptions::default()
        .with_on_change(Some(move |_: &Virtualizer<u64>, _| {
            c.fetch_add(1, Ordering::Relaxed);
        }));
    let mut v = Virtualizer::new(opts);
    v.set_items(short_posts(10));
    assert_eq!(calls.load(Ordering::Relaxed), 1);

    v.apply_scroll_offset_event(300, 0);
    assert_eq!(calls.load(Ordering::Relaxed), 2);

    // Identical measurement: no layout change, no notification.
    v.measure(1, 180);
    assert_eq!(calls.load(Ordering::Relaxed), 2);
}

#[test]
fn measurement_cache_export_import() {
    let mut v = feed(4, 1);
    v.measure(0, 200);
    v.measure(3, 400);
    let mut exported = v.export_measurements();
    exported.sort_unstable();
    assert_eq!(exported, [(0, 200), (3, 400)]);

    let mut w = feed(4, 1);
    w.import_measurements(exported.into_iter().chain([(1, 0)]));
    assert_eq!(w.item_size(0), Some(200));
    assert_eq!(w.item_size(1), Some(180));
    assert_eq!(w.item_size(3), Some(400));
    assert_eq!(w.heights().len(), 2);
}

#[test]
fn prefix_table_matches_naive_sums() {
    let mut rng = Lcg::new(11);
    let mut sizes: Vec<u32> = Vec::new();
    let mut table = PrefixTable::new();
    for _ in 0..500 {
        if sizes.is_empty() || rng.gen_bool() {
            let s = rng.gen_range_u32(1, 1000);
            sizes.push(s);
            table.push(s);
        } else {
            let i = rng.gen_range_usize(0, sizes.len());
            let s = rng.gen_range_u32(1, 1000);
            table.adjust(i, s as i64 - sizes[i] as i64);
            sizes[i] = s;
        }

        let mut acc = 0u64;
        for (i, &s) in sizes.iter().enumerate() {
            assert_eq!(table.offset_of(i), acc);
            acc += s as u64;
        }
        assert_eq!(table.total(), acc);

        let target = rng.gen_range_u64(0, acc + 10);
        let naive = {
            let mut sum = 0u64;
            let mut n = 0usize;
            for &s in &sizes {
                if sum + s as u64 <= target {
                    sum += s as u64;
                    n += 1;
                } else {
                    break;
                }
            }
            n
        };
        assert_eq!(table.rows_ending_by(target), naive);
    }

    let rebuilt = PrefixTable::from_sizes(&sizes);
    assert_eq!(rebuilt.len(), table.len());
    assert_eq!(rebuilt.total(), table.total());
}

fn tracked_feed() -> (Virtualizer<u64>, VisibilityTracker<u64>) {
    let mut v = feed(100, 3);
    v.set_viewport_size(800);
    (v, VisibilityTracker::new(TrackerOptions::default()))
}

fn ids(set: &KeySet<u64>) -> Vec<u64> {
    let mut out: Vec<u64> = set.iter().copied().collect();
    out.sort_unstable();
    out
}

#[test]
fn visibility_is_debounced() {
    let (v, mut t) = tracked_feed();
    t.on_scroll(0, 0);
    assert!(!t.tick(10, &v));
    assert!(!t.tick(49, &v));
    assert!(t.tick(50, &v));
    assert!(!t.is_pending());

    assert_eq!(ids(&t.snapshot().visible), [0, 1, 2, 3, 4]);
    // No direction yet: small window past the trailing edge.
    assert_eq!(ids(&t.snapshot().preload), [5, 6]);
}

#[test]
fn scroll_bursts_collapse_into_one_recompute() {
    let (mut v, mut t) = tracked_feed();
    for (i, offset) in [100u64, 300, 600, 900, 1000].into_iter().enumerate() {
        let now = i as u64 * 10;
        v.apply_scroll_offset_event(offset, now);
        t.on_scroll(offset, now);
        assert!(!t.tick(now, &v));
    }
    assert_eq!(t.deadline_ms(), Some(90));
    assert!(t.tick(90, &v));
    assert_eq!(t.revision(), 1);
    assert_eq!(ids(&t.snapshot().visible), [5, 6, 7, 8, 9]);
    assert_eq!(ids(&t.snapshot().preload), [10, 11, 12, 13, 14]);
}

#[test]
fn visibility_without_movement_publishes_nothing() {
    let published = Arc::new(AtomicUsize::new(0));
    let p = Arc::clone(&published);
    let (v, t) = tracked_feed();
    let mut t = t.with_on_change(Some(move |_: &VisibilitySnapshot<u64>| {
        p.fetch_add(1, Ordering::Relaxed);
    }));

    t.on_scroll(0, 0);
    assert!(t.tick(50, &v));
    let first = t.snapshot().clone();

    t.on_scroll(0, 100);
    assert!(!t.tick(150, &v));
    assert!(!t.recompute(&v));
    assert_eq!(&first, t.snapshot());
    assert_eq!(published.load(Ordering::Relaxed), 1);
}

#[test]
fn preload_follows_scroll_direction() {
    let (mut v, mut t) = tracked_feed();
    v.set_scroll_offset(1000);
    t.on_scroll(0, 0);
    t.on_scroll(1000, 1);
    assert!(t.tick(100, &v));
    assert_eq!(t.direction(), Some(ScrollDirection::Forward));
    assert_eq!(ids(&t.snapshot().preload), [10, 11, 12, 13, 14]);

    v.set_scroll_offset(900);
    t.on_scroll(900, 200);
    assert!(t.tick(300, &v));
    assert_eq!(t.direction(), Some(ScrollDirection::Backward));
    assert_eq!(ids(&t.snapshot().visible), [5, 6, 7, 8, 9]);
    assert_eq!(ids(&t.snapshot().preload), [3, 4]);
    assert!(t.should_preload(&4));
    assert!(t.is_visible(&9));
}

#[test]
fn preload_window_is_clamped_to_list_end() {
    let (mut v, mut t) = tracked_feed();
    let end = v.max_scroll_offset();
    v.set_scroll_offset(end);
    t.on_scroll(0, 0);
    t.on_scroll(end, 0);
    assert!(t.tick(50, &v));
    assert!(t.snapshot().preload.is_empty());
    assert_eq!(t.snapshot().visible_range.end_index, 100);
}

#[test]
fn cancel_and_reset_drop_pending_work() {
    let (v, mut t) = tracked_feed();
    t.on_scroll(0, 0);
    t.cancel();
    assert!(!t.tick(1_000, &v));
    assert!(t.snapshot().visible.is_empty());

    assert!(t.recompute(&v));
    t.reset();
    assert!(t.snapshot().visible.is_empty());
    assert_eq!(t.direction(), None);
}
