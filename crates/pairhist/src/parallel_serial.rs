//! Implements the "serial" backend for launching a grid of blocks

use pairhist_nostd_internal::{BlockIdx, Executor, GridShape, SCRATCHPAD_LEN};

/// Runs every block of a grid, one after another, on the calling thread
///
/// Blocks are launched in linear order (x varies fastest), so repeated
/// launches are bitwise reproducible. A single scratchpad is reused by every
/// block (and kept around between launches).
#[derive(Default)]
pub struct SerialExecutor {
    scratch: Vec<f32>,
}

impl SerialExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Executor for SerialExecutor {
    fn launch(&mut self, grid: &GridShape, run_block: &(impl Fn(BlockIdx, &mut [f32]) + Sync)) {
        if self.scratch.len() < SCRATCHPAD_LEN {
            self.scratch.resize(SCRATCHPAD_LEN, 0.0);
        }
        for linear in 0..grid.n_blocks() {
            run_block(grid.block_idx(linear), &mut self.scratch);
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use std::sync::Mutex;

    #[test]
    fn visits_blocks_in_order() {
        let grid = GridShape { x: 2, y: 3, z: 2 };
        let seen = Mutex::new(Vec::new());
        SerialExecutor::new().launch(&grid, &|block, scratch| {
            assert!(scratch.len() >= SCRATCHPAD_LEN);
            seen.lock().unwrap().push(block);
        });
        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 12);
        for (i, block) in seen.iter().enumerate() {
            assert_eq!(*block, grid.block_idx(i));
        }
    }
}
