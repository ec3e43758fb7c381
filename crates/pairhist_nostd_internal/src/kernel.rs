//! Implements the per-block logic of the histogram build
//!
//! Every block of the grid handles a single feature group (of up to 8
//! features) for a single partition. When multiple blocks share a feature
//! group (the blocks-per-feature multiplier, `N`, exceeds 1), the pairs of
//! the partition are dealt out among them:
//! - block `x` handles feature group `x / N` and acts as sub-block `x % N`
//! - thread `tid` of sub-block `s` handles pairs
//!   `s * BLOCK_SIZE + tid + k * N * BLOCK_SIZE` (for `k = 0, 1, ...`)
//!
//! The block accumulates, reduces, and then merges its compact statistics
//! into the global histogram.

use crate::accumulator::PairHistHalfByte;
use crate::atomic::AtomicF32;
use crate::grid::PassKind;
use crate::half_byte::{FEATURES_PER_WORD, feature_group_count};
use crate::layout::{DataPartition, DocPair, FeatureDescr};
use crate::parallel::{BlockIdx, GridShape, ThreadMember};
use crate::scratch::{BLOCK_SIZE, BUCKETS_PER_FOLD, ScratchpadViewMut, compact_offset};

/// values with a magnitude at or below this threshold aren't merged into the
/// global histogram
pub const MERGE_EPSILON: f32 = 1e-20;

/// the number of pairs that a thread loads before each batched accumulation
const UNROLL: usize = 4;

/// Bundles the read-only inputs of a histogram build
///
/// Construction doesn't perform any validation. The public crate checks
/// every logical precondition once, before any block is launched.
#[derive(Clone, Copy, Debug)]
pub struct PairwiseHistKernel<'a> {
    pub features: &'a [FeatureDescr],
    pub cindex: &'a [u32],
    pub pairs: &'a [DocPair],
    pub weights: &'a [f32],
    pub partitions: &'a [DataPartition],
    /// the number of folds in a single histogram line
    pub hist_line_size: usize,
    pub pass: PassKind,
}

impl<'a> PairwiseHistKernel<'a> {
    /// the grid shape when each feature group is handled by a single block
    pub fn base_grid_shape(&self) -> GridShape {
        self.pass
            .grid_shape(self.features.len(), self.partitions.len())
    }

    /// the grid shape when `blocks_per_feature` blocks share each feature
    /// group
    pub fn grid_shape(&self, blocks_per_feature: usize) -> GridShape {
        let base = self.base_grid_shape();
        GridShape {
            x: base.x * blocks_per_feature,
            ..base
        }
    }

    /// the number of floats held by the histogram buffer
    pub fn histogram_len(&self) -> usize {
        self.partitions.len() * self.hist_line_size * BUCKETS_PER_FOLD
    }

    /// execute the block at `block`
    ///
    /// `scratch` must hold at least [`crate::SCRATCHPAD_LEN`] floats; its
    /// initial content is ignored.
    pub fn run_block<const BLOCKS_PER_FEATURE: usize>(
        &self,
        block: BlockIdx,
        scratch: &mut [f32],
        histogram: &[AtomicF32],
    ) {
        let group = block.x / BLOCKS_PER_FEATURE;
        let sub_block = block.x % BLOCKS_PER_FEATURE;
        debug_assert!(group < feature_group_count(self.features.len()));

        let partition_index = self.pass.partition_index(block.y, block.z);
        let partition = self.partitions[partition_index];
        if partition.size == 0 {
            return;
        }

        let group_start = group * FEATURES_PER_WORD;
        let active_features = (self.features.len() - group_start).min(FEATURES_PER_WORD);
        let column = &self.cindex[self.features[group_start].offset..];
        let pairs = &self.pairs[partition.offset..partition.end()];
        let weights = &self.weights[partition.offset..partition.end()];

        let mut accum =
            PairHistHalfByte::new(ScratchpadViewMut::for_block(scratch), active_features);

        let stride = BLOCKS_PER_FEATURE * BLOCK_SIZE;
        for tid in 0..BLOCK_SIZE {
            let member = ThreadMember::new(tid as u32);
            let mut i = sub_block * BLOCK_SIZE + tid;

            while i + (UNROLL - 1) * stride < pairs.len() {
                let mut ci_a = [0_u32; UNROLL];
                let mut ci_b = [0_u32; UNROLL];
                let mut w = [0.0_f32; UNROLL];
                for k in 0..UNROLL {
                    let j = i + k * stride;
                    ci_a[k] = column[pairs[j].doc_a as usize];
                    ci_b[k] = column[pairs[j].doc_b as usize];
                    w[k] = weights[j];
                }
                accum.add_pairs::<UNROLL>(&member, &ci_a, &ci_b, &w);
                i += UNROLL * stride;
            }

            while i < pairs.len() {
                let pair = pairs[i];
                accum.add_pair(
                    &member,
                    column[pair.doc_a as usize],
                    column[pair.doc_b as usize],
                    weights[i],
                );
                i += stride;
            }
        }

        // block-wide barrier
        let scratch = accum.reduce();
        self.merge::<BLOCKS_PER_FEATURE>(
            scratch.compact(),
            &self.features[group_start..group_start + active_features],
            partition_index,
            histogram,
        );
    }

    fn merge<const BLOCKS_PER_FEATURE: usize>(
        &self,
        compact: &[f32],
        group_features: &[FeatureDescr],
        partition_index: usize,
        histogram: &[AtomicF32],
    ) {
        let line_start = partition_index * self.hist_line_size * BUCKETS_PER_FOLD;
        for (k, feature) in group_features.iter().enumerate() {
            let feature_start = line_start + BUCKETS_PER_FOLD * feature.first_fold_index;
            for fold in 0..feature.folds {
                for bucket in 0..BUCKETS_PER_FOLD {
                    let val = compact[compact_offset(k, fold, bucket)];
                    if val.abs() <= MERGE_EPSILON {
                        continue;
                    }
                    let dst = &histogram[feature_start + BUCKETS_PER_FOLD * fold + bucket];
                    if BLOCKS_PER_FEATURE == 1 {
                        dst.add_exclusive(val);
                    } else {
                        dst.fetch_add(val);
                    }
                }
            }
        }
    }
}
