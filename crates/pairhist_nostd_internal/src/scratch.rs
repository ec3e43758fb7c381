//! Defines the block-private scratchpad and the offset functions used to
//! address it.
//!
//! The scratchpad is an arena: a flat buffer of `f32` indexed by formula
//! rather than by named fields. It has 2 regions:
//! 1. one "warp histogram" of [`WARP_HIST_SIZE`] floats for every warp in the
//!    block. Each warp only ever writes to its own warp histogram while pairs
//!    are accumulated.
//! 2. a trailing "reduction tail" of [`WARP_HIST_SIZE`] floats that receives
//!    the sum over all warp histograms during the first reduction pass.
//!
//! After the reduction, the first [`COMPACT_HIST_LEN`] floats hold the
//! compact per-fold statistics (see [`compact_offset`]).
//!
//! # Warp histogram layout
//! Each warp histogram holds 4 "quadrant" counters for every combination of
//! (bin, half-warp, feature):
//!
//! ```text
//! offset = 64 * bin + 32 * half + 4 * feature + quadrant
//! ```
//!
//! The quadrant encodes which slot of the pair the bin came from and the
//! outcome of comparing the pair's two bins (see [`quadrant`]).

use crate::half_byte::{FEATURES_PER_WORD, MAX_BIN_COUNT, MAX_FOLD_COUNT};

/// the number of threads in a warp
pub const WARP_SIZE: usize = 32;

/// the number of threads in a cooperative group (half of a warp)
pub const HALF_WARP_SIZE: usize = 16;

/// the number of threads in a block
pub const BLOCK_SIZE: usize = 384;

/// the number of warps in a block
pub const WARPS_PER_BLOCK: usize = BLOCK_SIZE / WARP_SIZE;

/// the most warps whose partial sums the reduction can fold together
pub const MAX_WARPS_PER_BLOCK: usize = 32;

/// the number of floats in a single warp histogram
pub const WARP_HIST_SIZE: usize = 1024;

/// the number of counters tracked per (bin, half, feature)
pub const QUADRANT_COUNT: usize = 4;

/// the number of floats needed to describe a single fold
pub const BUCKETS_PER_FOLD: usize = 4;

/// the number of floats occupied by the compact statistics after reduction
pub const COMPACT_HIST_LEN: usize = BUCKETS_PER_FOLD * MAX_FOLD_COUNT * FEATURES_PER_WORD;

/// the number of floats in the scratchpad of a standard block
pub const SCRATCHPAD_LEN: usize = scratchpad_len(WARPS_PER_BLOCK);

/// the number of floats a scratchpad needs when a block has `n_warps` warps
pub const fn scratchpad_len(n_warps: usize) -> usize {
    WARP_HIST_SIZE * (n_warps + 1)
}

// the layout only works if every (bin, half, feature, quadrant) combination
// fits inside a single warp histogram
const _: () = assert!(MAX_BIN_COUNT * 2 * FEATURES_PER_WORD * QUADRANT_COUNT == WARP_HIST_SIZE);
const _: () = assert!(WARPS_PER_BLOCK <= MAX_WARPS_PER_BLOCK);

/// identifies which document of a pair a contribution comes from
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DocSlot {
    /// the first document (`doc_a`)
    A = 0,
    /// the second document (`doc_b`)
    B = 1,
}

/// quadrant: slot A, the pair satisfies `bin_a < bin_b`
pub const QUADRANT_A_BELOW: usize = 0;
/// quadrant: slot B, the pair satisfies `bin_a < bin_b`
pub const QUADRANT_B_BELOW: usize = 1;
/// quadrant: slot A, the pair satisfies `bin_a >= bin_b`
pub const QUADRANT_A_AT_OR_ABOVE: usize = 2;
/// quadrant: slot B, the pair satisfies `bin_a >= bin_b`
pub const QUADRANT_B_AT_OR_ABOVE: usize = 3;

/// compute the quadrant index for a contribution from `slot` of a pair,
/// where `a_at_or_above_b` holds the outcome of `bin_a >= bin_b`
#[inline(always)]
pub const fn quadrant(slot: DocSlot, a_at_or_above_b: bool) -> usize {
    2 * (a_at_or_above_b as usize) + (slot as usize)
}

/// compute the offset within a single warp histogram
#[inline(always)]
pub const fn warp_hist_offset(feature: usize, bin: usize, half: usize, quadrant: usize) -> usize {
    64 * bin + 32 * half + 4 * feature + quadrant
}

/// compute the offset of a bucket within the compact statistics
#[inline(always)]
pub const fn compact_offset(feature: usize, fold: usize, bucket: usize) -> usize {
    BUCKETS_PER_FOLD * (MAX_FOLD_COUNT * feature + fold) + bucket
}

/// A mutable view of a block's scratchpad
pub struct ScratchpadViewMut<'a> {
    data: &'a mut [f32],
}

impl<'a> ScratchpadViewMut<'a> {
    /// wrap `data`, which must hold the warp histograms of at least 1 warp,
    /// plus the reduction tail
    pub fn new(data: &'a mut [f32]) -> Result<Self, &'static str> {
        let len = data.len();
        if len % WARP_HIST_SIZE != 0 {
            Err("scratchpad length must be a multiple of the warp histogram size")
        } else if len < scratchpad_len(1) {
            Err("scratchpad must hold at least 1 warp histogram & the reduction tail")
        } else if len > scratchpad_len(MAX_WARPS_PER_BLOCK) {
            Err("scratchpad holds more warp histograms than the reduction supports")
        } else {
            Ok(Self { data })
        }
    }

    /// wrap the first [`SCRATCHPAD_LEN`] entries of a buffer handed out by an
    /// executor
    ///
    /// # Panics
    /// Panics if `data` is too short. That can only happen when an
    /// [`crate::Executor`] breaks its contract.
    pub(crate) fn for_block(data: &'a mut [f32]) -> Self {
        assert!(
            data.len() >= SCRATCHPAD_LEN,
            "the executor provided an undersized scratchpad"
        );
        Self {
            data: &mut data[..SCRATCHPAD_LEN],
        }
    }

    /// the number of warp histograms tracked by the scratchpad
    pub fn n_warps(&self) -> usize {
        self.data.len() / WARP_HIST_SIZE - 1
    }

    /// overwrite every entry with zero
    pub fn zero(&mut self) {
        self.data.fill(0.0);
    }

    /// the statistics produced by the reduction
    pub fn compact(&self) -> &[f32] {
        &self.data[..COMPACT_HIST_LEN]
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data[..]
    }
}
