//! Runtime configuration for [`crate::compute_with_config`]

use pairhist_nostd_internal::{
    BlockMultiplierPolicy, FixedMultiplier, GridShape, OccupancyHeuristic,
};

/// Selects the backend that launches the grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parallelism {
    /// run every block on the calling thread (bitwise reproducible)
    Serial,
    /// run the blocks on rayon's thread pool. When `n_threads` is `None`,
    /// the global pool is used. Otherwise, a dedicated pool is built for
    /// each call.
    Rayon { n_threads: Option<usize> },
}

/// Selects how many blocks share each feature group
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MultiplierChoice {
    /// let [`OccupancyHeuristic`] decide, using the number of worker threads
    /// as the number of compute units
    Auto,
    /// always use the specified multiplier. Values other than 1, 2, 4, 8, 16,
    /// 32 or 64 are fatal when a histogram is computed.
    Fixed(usize),
}

#[derive(Clone, Copy, Debug)]
pub struct HistConfig {
    pub parallelism: Parallelism,
    pub multiplier: MultiplierChoice,
    /// the heuristic never splits the pairs of a partition into chunks
    /// smaller than this (ignored for [`MultiplierChoice::Fixed`])
    pub min_pairs_per_block: usize,
}

impl Default for HistConfig {
    fn default() -> Self {
        Self {
            parallelism: Parallelism::Rayon { n_threads: None },
            multiplier: MultiplierChoice::Auto,
            min_pairs_per_block: OccupancyHeuristic::new(1).min_pairs_per_block,
        }
    }
}

impl HistConfig {
    pub fn serial() -> Self {
        Self {
            parallelism: Parallelism::Serial,
            ..Self::default()
        }
    }

    pub fn with_multiplier(self, multiplier: MultiplierChoice) -> Self {
        Self { multiplier, ..self }
    }

    /// build the policy described by the configuration, given the number of
    /// compute units
    pub(crate) fn policy(&self, compute_units: usize) -> ConfiguredPolicy {
        match self.multiplier {
            MultiplierChoice::Auto => {
                let mut heuristic = OccupancyHeuristic::new(compute_units);
                heuristic.min_pairs_per_block = self.min_pairs_per_block;
                ConfiguredPolicy::Heuristic(heuristic)
            }
            MultiplierChoice::Fixed(n) => ConfiguredPolicy::Fixed(FixedMultiplier(n)),
        }
    }
}

/// The policy selected by a [`HistConfig`]
#[derive(Clone, Copy, Debug)]
pub(crate) enum ConfiguredPolicy {
    Heuristic(OccupancyHeuristic),
    Fixed(FixedMultiplier),
}

impl BlockMultiplierPolicy for ConfiguredPolicy {
    fn blocks_per_feature(&self, grid: &GridShape, pair_count: usize) -> usize {
        match self {
            ConfiguredPolicy::Heuristic(p) => p.blocks_per_feature(grid, pair_count),
            ConfiguredPolicy::Fixed(p) => p.blocks_per_feature(grid, pair_count),
        }
    }
}
