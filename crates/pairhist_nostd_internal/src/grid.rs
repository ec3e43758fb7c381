//! Describes how the work is distributed across the execution grid
//!
//! - the grid's x dimension maps to feature groups (8 features per group),
//!   multiplied by the number of blocks that share each feature group (the
//!   "blocks per feature" multiplier)
//! - the grid's y & z dimensions map to partitions (see [`PassKind`])

use crate::half_byte::feature_group_count;
use crate::parallel::GridShape;

/// Every supported value of the blocks-per-feature multiplier
pub const SUPPORTED_BLOCKS_PER_FEATURE: [usize; 7] = [1, 2, 4, 8, 16, 32, 64];

/// the largest supported blocks-per-feature multiplier
pub const MAX_BLOCKS_PER_FEATURE: usize = 64;

/// check whether `n` is a supported blocks-per-feature multiplier
pub fn is_supported_blocks_per_feature(n: usize) -> bool {
    SUPPORTED_BLOCKS_PER_FEATURE.contains(&n)
}

/// Specifies which partitions a histogram build covers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassKind {
    /// compute a histogram for every partition. Grid row `y` handles
    /// partition `y`.
    Full,
    /// the partitions come in quartets, where each quartet holds the 4
    /// outcomes of a just-performed split (for the pair's document A and
    /// document B). Only the last 3 partitions of each quartet are computed;
    /// the first one is derived by subtracting the others from the parent
    /// histogram. Grid row `y` handles quartet `y` and the grid's z index
    /// selects one of the 3 computed partitions.
    DepthSplit,
}

impl PassKind {
    /// the grid shape for a single block per feature group
    pub fn grid_shape(&self, n_features: usize, n_partitions: usize) -> GridShape {
        let x = feature_group_count(n_features);
        match self {
            PassKind::Full => GridShape {
                x,
                y: n_partitions,
                z: 1,
            },
            PassKind::DepthSplit => GridShape {
                x,
                y: n_partitions / 4,
                z: 3,
            },
        }
    }

    /// the index of the partition handled by the block in grid row `y` and
    /// grid layer `z`
    #[inline(always)]
    pub fn partition_index(&self, y: usize, z: usize) -> usize {
        match self {
            PassKind::Full => y,
            PassKind::DepthSplit => 4 * y + 1 + z,
        }
    }

    /// whether the partition at `partition_index` is skipped by this pass
    pub fn skips_partition(&self, partition_index: usize) -> bool {
        match self {
            PassKind::Full => false,
            PassKind::DepthSplit => partition_index % 4 == 0,
        }
    }
}

/// A policy for choosing the number of blocks that share a feature group
///
/// The exact choice is a tuning decision. Implementers must return one of
/// [`SUPPORTED_BLOCKS_PER_FEATURE`]; anything else is treated as a fatal
/// configuration error by the driver.
pub trait BlockMultiplierPolicy {
    /// `grid` describes the grid when each feature group has a single block
    fn blocks_per_feature(&self, grid: &GridShape, pair_count: usize) -> usize;
}

/// Always uses the wrapped multiplier
#[derive(Clone, Copy, Debug)]
pub struct FixedMultiplier(pub usize);

impl BlockMultiplierPolicy for FixedMultiplier {
    fn blocks_per_feature(&self, _grid: &GridShape, _pair_count: usize) -> usize {
        self.0
    }
}

/// Keeps doubling the multiplier until there are enough blocks to occupy
/// the available compute units, or until each block would receive too few
/// pairs.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyHeuristic {
    /// the number of independent compute units (streaming multiprocessors,
    /// or CPU threads)
    pub compute_units: usize,
    /// how many blocks a compute unit can hold at once
    pub blocks_per_unit: usize,
    /// don't split the pairs any finer than this
    pub min_pairs_per_block: usize,
    /// the largest multiplier to consider (must be a supported multiplier)
    pub limit: usize,
}

impl OccupancyHeuristic {
    pub fn new(compute_units: usize) -> Self {
        Self {
            compute_units,
            blocks_per_unit: 2,
            min_pairs_per_block: 10000,
            limit: MAX_BLOCKS_PER_FEATURE,
        }
    }
}

impl BlockMultiplierPolicy for OccupancyHeuristic {
    fn blocks_per_feature(&self, grid: &GridShape, pair_count: usize) -> usize {
        let target = self.compute_units * self.blocks_per_unit;
        // the 3 layers of a depth-split pass can run concurrently, but we
        // don't count more than 4
        let base_blocks = grid.x * grid.y * grid.z.min(4);
        let mut multiplier = 1;
        // we want: base_blocks * multiplier < 1.25 * target
        while (4 * base_blocks * multiplier < 5 * target)
            && (pair_count / multiplier > self.min_pairs_per_block)
            && (multiplier < self.limit)
        {
            multiplier *= 2;
        }
        multiplier
    }
}
