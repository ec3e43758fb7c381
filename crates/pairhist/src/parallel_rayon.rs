//! Implements a multi-threaded backend on top of rayon

use pairhist_nostd_internal::{BlockIdx, Executor, GridShape, SCRATCHPAD_LEN};
use rayon::prelude::*;

use crate::error::Error;

/// Runs the blocks of a grid concurrently on a rayon thread pool
///
/// Each worker thread allocates a single scratchpad and reuses it for every
/// block that it runs. Blocks complete in an unspecified order, so results
/// are only reproducible up to floating point reassociation of the merges
/// into the global histogram.
pub struct RayonExecutor {
    // when None, we use rayon's global pool
    pool: Option<rayon::ThreadPool>,
}

impl RayonExecutor {
    /// use rayon's global thread pool
    pub fn new() -> Self {
        Self { pool: None }
    }

    /// use a dedicated pool with `n_threads` threads
    pub fn with_threads(n_threads: usize) -> Result<Self, Error> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .map_err(Error::thread_pool)?;
        Ok(Self { pool: Some(pool) })
    }

    /// the number of threads that blocks are distributed across
    pub fn n_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }
}

impl Default for RayonExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for RayonExecutor {
    fn launch(&mut self, grid: &GridShape, run_block: &(impl Fn(BlockIdx, &mut [f32]) + Sync)) {
        let n_blocks = grid.n_blocks();
        let body = || {
            (0..n_blocks).into_par_iter().for_each_init(
                || vec![0.0_f32; SCRATCHPAD_LEN],
                |scratch, linear| run_block(grid.block_idx(linear), scratch),
            )
        };
        match &self.pool {
            Some(pool) => pool.install(body),
            None => body(),
        }
    }
}
