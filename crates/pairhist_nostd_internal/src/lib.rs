/*!
The kernel-side building blocks of the `pairhist` crate.

Everything in this crate is written in terms of a GPU execution model (see
the [`Executor`] trait) and operates on flat slices, so that it can be
ported to a device. The pieces, from the leaves up:
- [`half_byte_shift`] & friends describe how 8 four-bit bins are packed into
  a single `u32` word of the compressed index
- [`ScratchpadViewMut`] wraps the block-private arena, which is addressed
  with [`warp_hist_offset`] & [`compact_offset`]
- [`PairHistHalfByte`] accumulates weighted pairs into per-warp, per-bin
  counters, and its `reduce` method folds those counters into 4 buckets per
  fold
- [`PairwiseHistKernel`] runs a single block of the grid: it deals out the
  pairs of a partition, accumulates, reduces & merges into the global
  histogram
- [`BlockMultiplierPolicy`] decides how many blocks share a feature group

[`naive_pairwise_histogram`] is a slow reference implementation.
*/
#![no_std]
mod accumulator;
mod atomic;
mod grid;
mod half_byte;
mod kernel;
mod layout;
mod naive;
mod parallel;
mod reduction;
mod scratch;

pub use accumulator::PairHistHalfByte;
pub use atomic::AtomicF32;
pub use grid::{
    BlockMultiplierPolicy, FixedMultiplier, MAX_BLOCKS_PER_FEATURE, OccupancyHeuristic, PassKind,
    SUPPORTED_BLOCKS_PER_FEATURE, is_supported_blocks_per_feature,
};
pub use half_byte::{
    BITS_PER_FEATURE, FEATURES_PER_WORD, MAX_BIN_COUNT, MAX_FOLD_COUNT, extract_half_byte,
    feature_group_count, half_byte_shift, insert_half_byte, pack_half_bytes,
};
pub use kernel::{MERGE_EPSILON, PairwiseHistKernel};
pub use layout::{
    DataPartition, DocPair, FeatureDescr, check_features, check_partitions,
    required_hist_line_size,
};
pub use naive::{classify_pair, naive_pairwise_histogram};
pub use parallel::{BlockIdx, Executor, GridShape, ThreadMember};
pub use reduction::{GREATER_BOTH, LEQ_A, LEQ_B, LEQ_BOTH, fold_buckets};
pub use scratch::{
    BLOCK_SIZE, BUCKETS_PER_FOLD, COMPACT_HIST_LEN, DocSlot, HALF_WARP_SIZE, QUADRANT_A_AT_OR_ABOVE,
    QUADRANT_A_BELOW, QUADRANT_B_AT_OR_ABOVE, QUADRANT_B_BELOW, QUADRANT_COUNT, SCRATCHPAD_LEN,
    ScratchpadViewMut, WARP_HIST_SIZE, WARP_SIZE, WARPS_PER_BLOCK, compact_offset, quadrant,
    scratchpad_len, warp_hist_offset,
};
