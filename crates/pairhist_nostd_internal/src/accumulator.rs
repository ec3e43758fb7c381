//! Defines the pairwise histogram accumulator
//!
//! # Overview
//!
//! The accumulator consumes pairs of documents. For each pair, we know:
//! - the packed compressed-index word of document A (`ci_a`)
//! - the packed compressed-index word of document B (`ci_b`)
//! - the pair's weight, `w`
//!
//! For every active feature of the group, we extract `bin_a` and `bin_b`
//! and make 2 contributions of `w` to the warp histogram of the calling
//! thread:
//! 1. at `bin_a`, in the quadrant for slot A
//! 2. at `bin_b`, in the quadrant for slot B
//!
//! Both contributions use the same comparison outcome (`bin_a >= bin_b`).
//! These per-bin counters are enough for the reduction to recover, for every
//! fold, which side of the threshold each document of a pair falls on (see
//! [`crate::reduction`]). Ties are resolved by the comparison: a pair with
//! `bin_a == bin_b` is always counted as "at or above", so it lands in
//! exactly one quadrant per slot.
//!
//! # Contention
//! Within a cooperative group, different members can resolve to the same
//! offset. On a GPU, the members of the group synchronize between the
//! slot-A writes and the slot-B writes, and the 2 cooperative groups of a
//! warp write to separate halves of the warp histogram. We also rotate the
//! order in which members visit the features (by lane) to spread out
//! simultaneous writes.

use crate::half_byte::{FEATURES_PER_WORD, extract_half_byte};
use crate::parallel::ThreadMember;
use crate::reduction::reduce_scratchpad;
use crate::scratch::{DocSlot, ScratchpadViewMut, WARP_HIST_SIZE, quadrant, warp_hist_offset};

/// Accumulates weighted bin-pair counters for a single block
///
/// This holds the block's scratchpad for its entire lifetime. Construction
/// zeroes the scratchpad and [`PairHistHalfByte::reduce`] consumes the
/// accumulator.
pub struct PairHistHalfByte<'a> {
    scratch: ScratchpadViewMut<'a>,
    active_features: usize,
}

impl<'a> PairHistHalfByte<'a> {
    /// zero the scratchpad and prepare to accumulate `active_features`
    /// features (the remaining slots of each packed word are ignored)
    pub fn new(mut scratch: ScratchpadViewMut<'a>, active_features: usize) -> Self {
        assert!(active_features <= FEATURES_PER_WORD);
        scratch.zero();
        // on a GPU, a block-wide barrier goes here
        Self {
            scratch,
            active_features,
        }
    }

    #[inline(always)]
    pub fn active_features(&self) -> usize {
        self.active_features
    }

    /// consume a single pair on behalf of `member`
    #[inline(always)]
    pub fn add_pair(&mut self, member: &ThreadMember, ci_a: u32, ci_b: u32, weight: f32) {
        self.add_pairs::<1>(member, &[ci_a], &[ci_b], &[weight]);
    }

    /// consume `N` pairs on behalf of `member`.
    ///
    /// This is equivalent to `N` calls to [`PairHistHalfByte::add_pair`]. We
    /// compute all of the offsets before making any writes, so that each
    /// write-phase only requires a single synchronization of the
    /// cooperative group.
    #[inline(always)]
    pub fn add_pairs<const N: usize>(
        &mut self,
        member: &ThreadMember,
        ci_a: &[u32; N],
        ci_b: &[u32; N],
        weight: &[f32; N],
    ) {
        let warp_start = member.warp() * WARP_HIST_SIZE;
        let half = member.half();
        let rotation = member.lane();
        let active_features = self.active_features;
        let data = self.scratch.as_mut_slice();

        for i in 0..FEATURES_PER_WORD {
            let feature = (i + rotation) % FEATURES_PER_WORD;
            // members with an inactive feature sit out of this step (but they
            // still participate in the barriers on a GPU)
            if feature >= active_features {
                continue;
            }

            let mut offsets_a = [0_usize; N];
            let mut offsets_b = [0_usize; N];
            for j in 0..N {
                let bin_a = extract_half_byte(ci_a[j], feature);
                let bin_b = extract_half_byte(ci_b[j], feature);
                let a_at_or_above_b = bin_a >= bin_b;
                offsets_a[j] = warp_start
                    + warp_hist_offset(feature, bin_a, half, quadrant(DocSlot::A, a_at_or_above_b));
                offsets_b[j] = warp_start
                    + warp_hist_offset(feature, bin_b, half, quadrant(DocSlot::B, a_at_or_above_b));
            }

            // cooperative-group barrier
            for j in 0..N {
                data[offsets_a[j]] += weight[j];
            }
            // cooperative-group barrier
            for j in 0..N {
                data[offsets_b[j]] += weight[j];
            }
        }
    }

    /// fold the partial sums into the compact per-fold statistics.
    ///
    /// Afterwards, the compact statistics are accessible through
    /// [`ScratchpadViewMut::compact`].
    pub fn reduce(self) -> ScratchpadViewMut<'a> {
        let mut scratch = self.scratch;
        reduce_scratchpad(&mut scratch, self.active_features);
        scratch
    }
}
