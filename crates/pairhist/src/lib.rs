/*!
Computes pairwise split histograms for gradient-boosted decision tree
training, using GPU-style kernels that run on the CPU.

<div class="warning">

This crate is still in early development.

</div>

# High-Level: Pairwise Split Histograms

Pairwise ranking objectives attach a weight to pairs of documents. To score
a candidate split of a tree node, the tree-growing routine needs to know,
for every threshold ("fold") of every feature, how much pair weight falls
into each of 4 buckets:
- only document A lies at or below the threshold
- only document B lies at or below the threshold
- both documents lie at or below the threshold
- both documents lie above the threshold

Computing these statistics once, for every partition (tree node) and every
fold, means the raw pairs never need to be rescanned while splits are
scored. For a fixed fold, the 4 buckets always sum to the total pair weight
of the partition.

# User Guide

1. Pack the quantized features with [`CompressedIndex::from_bins`] (every
   feature must have at most 16 bins, so 8 features fit in a `u32`).
2. Describe the pairs, weights & partitions and validate everything with
   [`PairwiseHistInputs::new`].
3. Allocate a zeroed [`HistogramBuffer`] and call
   [`compute_with_config`] (or [`compute_pairwise_histogram`] to pick the
   [`Executor`] and [`BlockMultiplierPolicy`] yourself).

After a [`PassKind::DepthSplit`] pass, call
[`HistogramBuffer::restore_skipped_partitions`] to derive the partitions
that were skipped.

Enable a [`log`] backend to see the chosen launch configuration.

# Developer Guide

See the crate-level documentation for [`pairhist_nostd_internal`].

*/

#![deny(rustdoc::broken_intra_doc_links)]

// inform build-system of the crates in this package
mod compute;
mod config;
mod error;
mod histogram;
mod inputs;
mod packing;
mod parallel_rayon;
mod parallel_serial;

// pull in symbols that visible outside of the package
pub use compute::{compute_pairwise_histogram, compute_with_config};
pub use config::{HistConfig, MultiplierChoice, Parallelism};
pub use error::Error;
pub use histogram::{FoldStats, HistogramBuffer};
pub use inputs::PairwiseHistInputs;
pub use packing::CompressedIndex;
pub use pairhist_nostd_internal::{
    BlockMultiplierPolicy, DataPartition, DocPair, Executor, FeatureDescr, FixedMultiplier,
    GREATER_BOTH, LEQ_A, LEQ_B, LEQ_BOTH, OccupancyHeuristic, PassKind,
    SUPPORTED_BLOCKS_PER_FEATURE, naive_pairwise_histogram,
};
pub use parallel_rayon::RayonExecutor;
pub use parallel_serial::SerialExecutor;
