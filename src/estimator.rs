const HISTORY_SLOTS: usize = 3;

/// Streaming estimate of the normal frame size: a pseudo-median over the last
/// three observed sizes.
///
/// The history is kept sorted with adjacent swaps after each insert, and the
/// write cursor rotates through the sorted slots rather than tracking FIFO
/// order, so the oldest-by-arrival size is not necessarily the one replaced.
/// That makes the estimate lag and smooth camera size jitter instead of
/// following it exactly, which is what the oversize test wants.
#[derive(Debug)]
pub struct SizeEstimator {
    sizes: [u64; HISTORY_SLOTS],
    cursor: usize,
    default_size: u64,
}

/// Unfilled slots (zero) sort after every real size so the median slot stays
/// zero until enough frames have been seen.
#[inline]
fn sort_key(size: u64) -> u64 {
    if size == 0 { u64::MAX } else { size }
}

impl SizeEstimator {
    pub fn new(default_size: u64) -> Self {
        Self {
            sizes: [0; HISTORY_SLOTS],
            cursor: 0,
            default_size,
        }
    }

    /// Records a frame size and returns the current expected size.
    pub fn observe(&mut self, size: u64) -> u64 {
        self.sizes[self.cursor] = size;

        // Only the slot we just wrote is out of place: bubble it into
        // position with adjacent swaps.
        let mut i = self.cursor;
        while i + 1 < HISTORY_SLOTS && sort_key(self.sizes[i]) > sort_key(self.sizes[i + 1]) {
            self.sizes.swap(i, i + 1);
            i += 1;
        }
        while i > 0 && sort_key(self.sizes[i]) < sort_key(self.sizes[i - 1]) {
            self.sizes.swap(i, i - 1);
            i -= 1;
        }

        self.cursor = (self.cursor + 1) % HISTORY_SLOTS;

        let median = self.sizes[HISTORY_SLOTS / 2];
        let expected = if median == 0 { self.default_size } else { median };

        tracing::trace!(expected, sizes = ?self.sizes, "size history updated");
        metrics::histogram!("defuse_expected_size_bytes").record(expected as f64);

        expected
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const DEFAULT: u64 = 250_000;

    #[test]
    fn empty_history_returns_default() {
        let mut est = SizeEstimator::new(DEFAULT);
        assert_eq!(est.observe(300_000), DEFAULT);
    }

    #[test]
    fn two_zero_slots_still_return_default() {
        let mut est = SizeEstimator::new(DEFAULT);
        est.observe(300_000);
        // one real size in a three-slot history leaves the median slot zero
        assert_eq!(est.sizes[1], 0);
    }

    #[test]
    fn full_history_returns_median() {
        let mut est = SizeEstimator::new(DEFAULT);
        est.observe(250_000);
        est.observe(248_000);
        let expected = est.observe(251_000);
        assert_eq!(expected, 250_000);
    }

    #[test]
    fn two_observations_return_larger() {
        let mut est = SizeEstimator::new(DEFAULT);
        est.observe(100_000);
        // zero sorts last, so the median of {100k, 120k, unfilled} is 120k
        assert_eq!(est.observe(120_000), 120_000);
    }

    #[test]
    fn history_stays_sorted_across_rotation() {
        let mut est = SizeEstimator::new(DEFAULT);
        for size in [90_000, 110_000, 100_000, 105_000, 95_000, 102_000] {
            est.observe(size);
        }
        let keys: Vec<u64> = est.sizes.iter().copied().map(sort_key).collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]), "{:?}", est.sizes);
    }

    #[test]
    fn fused_size_does_not_dominate_median() {
        let mut est = SizeEstimator::new(DEFAULT);
        est.observe(100_000);
        est.observe(100_000);
        est.observe(100_000);
        // a single fused frame lands in the top slot and leaves the median alone
        assert_eq!(est.observe(200_000), 100_000);
    }
}
