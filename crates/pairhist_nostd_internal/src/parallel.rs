//! Our parallelism abstractions mirror the GPU execution model
//!
//! The histogram calculation is decomposed over a 3D grid of blocks. Every
//! block is composed of [`BLOCK_SIZE`] threads:
//! - threads are organized into warps of [`WARP_SIZE`] threads
//! - each warp is split into 2 cooperative groups of [`HALF_WARP_SIZE`]
//!   threads. The members of a cooperative group work in lockstep and
//!   synchronize at explicit barriers.
//!
//! On a GPU, every thread of a block executes simultaneously. The backends
//! that we provide (in the `pairhist` crate) run on CPUs: a single CPU thread
//! simulates every member of a block, one member at a time, and different
//! blocks may run on different CPU threads. Code that is written in terms of
//! [`ThreadMember`] is structured so that it produces the same result either
//! way:
//! - a block-private scratchpad is only ever touched by the members of a
//!   single block
//! - the only memory shared between blocks is the global histogram, which is
//!   exclusively mutated through addition
//!
//! # Why not emulate barriers?
//! When a single CPU thread simulates each member of a block in sequence,
//! every write made by one phase is trivially visible to the next phase. We
//! annotate the locations where a barrier would be required on a GPU, so the
//! logic can be ported.

use crate::scratch::{BLOCK_SIZE, HALF_WARP_SIZE, WARP_SIZE};

/// Describes the identity of a single thread within a block
#[derive(Clone, Copy, Debug)]
pub struct ThreadMember(u32);

impl ThreadMember {
    pub fn new(rank: u32) -> Self {
        debug_assert!((rank as usize) < BLOCK_SIZE);
        ThreadMember(rank)
    }

    /// the index of the warp that holds the thread
    #[inline(always)]
    pub fn warp(&self) -> usize {
        (self.0 as usize) / WARP_SIZE
    }

    /// the thread's index within its warp
    #[inline(always)]
    pub fn lane(&self) -> usize {
        (self.0 as usize) % WARP_SIZE
    }

    /// which of the 2 cooperative groups in the warp holds the thread
    #[inline(always)]
    pub fn half(&self) -> usize {
        self.lane() / HALF_WARP_SIZE
    }
}

/// The shape of the execution grid, measured in blocks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridShape {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl GridShape {
    /// the total number of blocks in the grid
    pub fn n_blocks(&self) -> usize {
        self.x * self.y * self.z
    }

    /// map a linear block index to a [`BlockIdx`]. The x index varies the
    /// fastest.
    #[inline(always)]
    pub fn block_idx(&self, linear: usize) -> BlockIdx {
        BlockIdx {
            x: linear % self.x,
            y: (linear / self.x) % self.y,
            z: linear / (self.x * self.y),
        }
    }
}

/// The position of a single block within the grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockIdx {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

/// a trait for expressing how to launch every block in a grid
///
/// We implement this for each parallelism "backend," so we have a uniform
/// interface for easily switching between backends.
///
/// Types that implement this trait are responsible for providing each block
/// with a scratchpad that holds at least [`crate::SCRATCHPAD_LEN`] floats.
/// The content of the scratchpad is unspecified when a block starts.
///
/// **NOTE:** launching a grid runs to completion before returning. There is
/// no cancellation.
pub trait Executor {
    fn launch(&mut self, grid: &GridShape, run_block: &(impl Fn(BlockIdx, &mut [f32]) + Sync));
}
