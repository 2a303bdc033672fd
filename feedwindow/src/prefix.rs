use alloc::vec::Vec;
use core::cmp;

/// Cumulative row offsets backed by a Fenwick tree.
///
/// `offset_of(i)` is the sum of sizes `0..i`. Changing one size or appending one row costs
/// `O(log n)`; nothing is recomputed wholesale on scroll.
#[derive(Clone, Debug)]
pub(crate) struct PrefixTable {
    tree: Vec<u64>, // 1-indexed
    total: u64,
    top_bit: usize,
}

impl PrefixTable {
    pub(crate) fn new() -> Self {
        Self {
            tree: alloc::vec![0],
            total: 0,
            top_bit: 0,
        }
    }

    pub(crate) fn from_sizes(sizes: &[u32]) -> Self {
        let n = sizes.len();
        let mut tree = alloc::vec![0u64; n + 1];
        let mut total = 0u64;
        for i in 1..=n {
            let v = sizes[i - 1] as u64;
            total = total.saturating_add(v);
            tree[i] = tree[i].saturating_add(v);
            let parent = i + low_bit(i);
            if parent <= n {
                tree[parent] = tree[parent].saturating_add(tree[i]);
            }
        }
        Self {
            tree,
            total,
            top_bit: top_bit(n),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tree.len() - 1
    }

    pub(crate) fn total(&self) -> u64 {
        self.total
    }

    /// Appends one row of `size`.
    pub(crate) fn push(&mut self, size: u32) {
        let n = self.len() + 1;
        let size = size as u64;
        // tree[n] covers the `low_bit(n)` rows ending at n; the rows before n come from
        // prefix sums that are already in place.
        let covered_from = n - low_bit(n);
        let carried = self
            .offset_of(n - 1)
            .saturating_sub(self.offset_of(covered_from));
        self.tree.push(carried.saturating_add(size));
        self.total = self.total.saturating_add(size);
        self.top_bit = top_bit(n);
    }

    /// Applies a size change of `delta` to row `index`. Out-of-range indexes are ignored.
    pub(crate) fn adjust(&mut self, index: usize, delta: i64) {
        let n = self.len();
        if index >= n || delta == 0 {
            return;
        }
        self.total = apply_delta(self.total, delta);
        let mut i = index + 1;
        while i <= n {
            debug_assert!(
                self.tree[i] as i128 + delta as i128 >= 0,
                "prefix table underflow (node={i}, delta={delta})"
            );
            self.tree[i] = apply_delta(self.tree[i], delta);
            i += low_bit(i);
        }
    }

    /// Sum of the first `count` sizes (clamped to the row count).
    pub(crate) fn offset_of(&self, count: usize) -> u64 {
        let mut i = cmp::min(count, self.len());
        let mut sum = 0u64;
        while i > 0 {
            sum = sum.saturating_add(self.tree[i]);
            i &= i - 1;
        }
        sum
    }

    /// Number of leading rows that end at or before `offset`.
    ///
    /// For an offset inside the list this is the index of the row containing it.
    pub(crate) fn rows_ending_by(&self, mut offset: u64) -> usize {
        let n = self.len();
        let mut idx = 0usize;
        let mut bit = self.top_bit;
        while bit != 0 {
            let next = idx + bit;
            if next <= n && self.tree[next] <= offset {
                offset -= self.tree[next];
                idx = next;
            }
            bit >>= 1;
        }
        idx
    }
}

fn apply_delta(v: u64, delta: i64) -> u64 {
    if delta >= 0 {
        v.saturating_add(delta as u64)
    } else {
        v.saturating_sub(delta.unsigned_abs())
    }
}

fn low_bit(i: usize) -> usize {
    i & i.wrapping_neg()
}

fn top_bit(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        1usize << (usize::BITS - 1 - n.leading_zeros())
    }
}
