//! Folds a block's scratchpad into compact per-fold statistics
//!
//! # Buckets
//!
//! Fold `t` of a feature corresponds to the threshold "documents with
//! `bin <= t` go left". For a pair with bins `a` & `b`, exactly one of the 4
//! buckets of fold `t` receives the pair's weight:
//!
//! | bucket             | condition                  |
//! |--------------------|----------------------------|
//! | [`LEQ_A`]          | `a <= t < b`               |
//! | [`LEQ_B`]          | `b <= t < a`               |
//! | [`LEQ_BOTH`]       | `a <= t` and `b <= t`      |
//! | [`GREATER_BOTH`]   | `a > t` and `b > t`        |
//!
//! # Deriving the buckets
//!
//! The accumulator only records per-bin quadrant counters. Let `S(q)` denote
//! the sum of quadrant `q` over bins `0..=t` and `T(q)` the sum over all
//! bins. Then:
//! - `LEQ_A        = S(A, a<b)  - S(B, a<b)`
//! - `LEQ_B        = S(B, a>=b) - S(A, a>=b)`
//! - `LEQ_BOTH     = S(B, a<b)  + S(A, a>=b)`
//! - `GREATER_BOTH = (T(A, a<b) - S(A, a<b)) + (T(B, a>=b) - S(B, a>=b))`
//!
//! For example, a pair with `a < b` contributes to `S(A, a<b)` once `t >= a`
//! and to `S(B, a<b)` once `t >= b`; the difference is non-zero precisely
//! when `a <= t < b`.

use crate::half_byte::{FEATURES_PER_WORD, MAX_BIN_COUNT, MAX_FOLD_COUNT};
use crate::scratch::{
    BUCKETS_PER_FOLD, QUADRANT_A_AT_OR_ABOVE, QUADRANT_A_BELOW, QUADRANT_B_AT_OR_ABOVE,
    QUADRANT_B_BELOW, QUADRANT_COUNT, ScratchpadViewMut, WARP_HIST_SIZE, compact_offset,
    warp_hist_offset,
};

/// bucket: only document A lies at or below the threshold
pub const LEQ_A: usize = 0;
/// bucket: only document B lies at or below the threshold
pub const LEQ_B: usize = 1;
/// bucket: both documents lie at or below the threshold
pub const LEQ_BOTH: usize = 2;
/// bucket: both documents lie above the threshold
pub const GREATER_BOTH: usize = 3;

const _: () = assert!(BUCKETS_PER_FOLD == 4);

/// compute the 4 buckets of fold `t` from the per-fold prefix sums
/// (`leq[q]`) and per-feature totals (`total[q]`) of each quadrant
#[inline(always)]
pub fn fold_buckets(
    leq: &[f32; QUADRANT_COUNT],
    total: &[f32; QUADRANT_COUNT],
) -> [f32; BUCKETS_PER_FOLD] {
    let mut out = [0.0; BUCKETS_PER_FOLD];
    out[LEQ_A] = leq[QUADRANT_A_BELOW] - leq[QUADRANT_B_BELOW];
    out[LEQ_B] = leq[QUADRANT_B_AT_OR_ABOVE] - leq[QUADRANT_A_AT_OR_ABOVE];
    out[LEQ_BOTH] = leq[QUADRANT_B_BELOW] + leq[QUADRANT_A_AT_OR_ABOVE];
    out[GREATER_BOTH] = (total[QUADRANT_A_BELOW] - leq[QUADRANT_A_BELOW])
        + (total[QUADRANT_B_AT_OR_ABOVE] - leq[QUADRANT_B_AT_OR_ABOVE]);
    out
}

/// reduce the scratchpad in place.
///
/// The compact statistics of feature `k < active_features` are written to
/// the start of the scratchpad (see [`compact_offset`]); the compact entries
/// of inactive features are zeroed.
pub(crate) fn reduce_scratchpad(scratch: &mut ScratchpadViewMut, active_features: usize) {
    let n_warps = scratch.n_warps();
    let data = scratch.as_mut_slice();
    let tail_start = n_warps * WARP_HIST_SIZE;

    // pass 1: on a GPU, the threads of the block stride over the positions of
    // a warp histogram. Each position gathers the partial sums of every warp
    // (the warps are WARP_HIST_SIZE apart) and writes the result to the tail
    for position in 0..WARP_HIST_SIZE {
        let mut sum = 0.0;
        let mut i = position;
        while i < tail_start {
            sum += data[i];
            i += WARP_HIST_SIZE;
        }
        data[tail_start + position] = sum;
    }

    // block-wide barrier

    // pass 2: each (feature, fold) is handled by a separate thread. It merges
    // the 2 halves and computes prefix sums directly from the tail. Since the
    // compact region overlaps with warp 0 (and never with the tail), there
    // aren't any read-write hazards.
    let (head, tail) = data.split_at_mut(tail_start);
    for feature in 0..FEATURES_PER_WORD {
        if feature >= active_features {
            for fold in 0..MAX_FOLD_COUNT {
                let start = compact_offset(feature, fold, 0);
                head[start..start + BUCKETS_PER_FOLD].fill(0.0);
            }
            continue;
        }

        let mut total = [0.0_f32; QUADRANT_COUNT];
        for bin in 0..MAX_BIN_COUNT {
            accumulate_bin(&mut total, tail, feature, bin);
        }

        for fold in 0..MAX_FOLD_COUNT {
            let mut leq = [0.0_f32; QUADRANT_COUNT];
            for bin in 0..=fold {
                accumulate_bin(&mut leq, tail, feature, bin);
            }
            let start = compact_offset(feature, fold, 0);
            head[start..start + BUCKETS_PER_FOLD].copy_from_slice(&fold_buckets(&leq, &total));
        }
    }

    // block-wide barrier
}

#[inline(always)]
fn accumulate_bin(sums: &mut [f32; QUADRANT_COUNT], tail: &[f32], feature: usize, bin: usize) {
    for (q, sum) in sums.iter_mut().enumerate() {
        *sum += tail[warp_hist_offset(feature, bin, 0, q)]
            + tail[warp_hist_offset(feature, bin, 1, q)];
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::accumulator::PairHistHalfByte;
    use crate::half_byte::pack_half_bytes;
    use crate::parallel::ThreadMember;
    use crate::scratch::SCRATCHPAD_LEN;

    fn buckets(compact: &[f32], feature: usize, fold: usize) -> [f32; 4] {
        let start = compact_offset(feature, fold, 0);
        [
            compact[start],
            compact[start + 1],
            compact[start + 2],
            compact[start + 3],
        ]
    }

    #[test]
    fn single_pair_buckets() {
        let mut buf = [0.0_f32; SCRATCHPAD_LEN];
        let mut accum = PairHistHalfByte::new(ScratchpadViewMut::new(&mut buf).unwrap(), 1);
        accum.add_pair(
            &ThreadMember::new(5),
            pack_half_bytes(&[3]).unwrap(),
            pack_half_bytes(&[7]).unwrap(),
            2.0,
        );
        let scratch = accum.reduce();
        let compact = scratch.compact();
        for fold in 0..3 {
            assert_eq!(buckets(compact, 0, fold), [0.0, 0.0, 0.0, 2.0]);
        }
        for fold in 3..7 {
            assert_eq!(buckets(compact, 0, fold), [2.0, 0.0, 0.0, 0.0]);
        }
        for fold in 7..16 {
            assert_eq!(buckets(compact, 0, fold), [0.0, 0.0, 2.0, 0.0]);
        }
    }

    #[test]
    fn swapped_and_tied_pairs() {
        let mut buf = [0.0_f32; SCRATCHPAD_LEN];
        let mut accum = PairHistHalfByte::new(ScratchpadViewMut::new(&mut buf).unwrap(), 2);
        // feature 0: a = 12, b = 4 (A is the larger bin)
        // feature 1: a = b = 5
        accum.add_pair(
            &ThreadMember::new(300),
            pack_half_bytes(&[12, 5]).unwrap(),
            pack_half_bytes(&[4, 5]).unwrap(),
            1.0,
        );
        let scratch = accum.reduce();
        let compact = scratch.compact();
        assert_eq!(buckets(compact, 0, 3), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(buckets(compact, 0, 4), [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(buckets(compact, 0, 11), [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(buckets(compact, 0, 12), [0.0, 0.0, 1.0, 0.0]);
        assert_eq!(buckets(compact, 1, 4), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(buckets(compact, 1, 5), [0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn conservation_across_warps() {
        let mut buf = [0.0_f32; SCRATCHPAD_LEN];
        let mut accum = PairHistHalfByte::new(ScratchpadViewMut::new(&mut buf).unwrap(), 8);
        let mut total_weight = 0.0;
        for rank in 0..384_u32 {
            // these values were chosen arbitrarily
            let ci_a = rank.wrapping_mul(2_654_435_761);
            let ci_b = rank.wrapping_mul(40_503).rotate_left(rank % 32);
            let weight = (1 + rank % 3) as f32;
            accum.add_pair(&ThreadMember::new(rank), ci_a, ci_b, weight);
            total_weight += weight;
        }
        let scratch = accum.reduce();
        let compact = scratch.compact();
        for feature in 0..8 {
            for fold in 0..16 {
                let sum: f32 = buckets(compact, feature, fold).iter().sum();
                assert_eq!(sum, total_weight);
            }
        }
    }

    #[test]
    fn inactive_compact_entries_are_zeroed() {
        let mut buf = [1.0_f32; SCRATCHPAD_LEN];
        let accum = PairHistHalfByte::new(ScratchpadViewMut::new(&mut buf).unwrap(), 3);
        let scratch = accum.reduce();
        assert!(scratch.compact().iter().all(|x| *x == 0.0));
    }
}
