//! The host-side entry points of the histogram build

use log::{debug, error, trace};
use pairhist_nostd_internal::{BlockMultiplierPolicy, Executor, PairwiseHistKernel};

use crate::config::{HistConfig, Parallelism};
use crate::error::Error;
use crate::histogram::HistogramBuffer;
use crate::inputs::PairwiseHistInputs;
use crate::parallel_rayon::RayonExecutor;
use crate::parallel_serial::SerialExecutor;

/// add the pairwise histograms described by `inputs` to `histogram`
///
/// Callers are responsible for zeroing `histogram` beforehand. For a
/// [`pairhist_nostd_internal::PassKind::DepthSplit`] pass, the first
/// partition of each quartet is left untouched (see
/// [`HistogramBuffer::restore_skipped_partitions`]).
///
/// The result is available as soon as this returns.
///
/// # Panics
/// Panics if `policy` picks an unsupported blocks-per-feature multiplier
/// (anything other than 1, 2, 4, 8, 16, 32 or 64).
pub fn compute_pairwise_histogram(
    executor: &mut impl Executor,
    policy: &impl BlockMultiplierPolicy,
    inputs: &PairwiseHistInputs,
    histogram: &mut HistogramBuffer,
) -> Result<(), Error> {
    if histogram.n_partitions() != inputs.partitions().len()
        || histogram.line_size() != inputs.hist_line_size()
    {
        return Err(Error::histogram_shape(
            inputs.partitions().len(),
            inputs.hist_line_size(),
            histogram.n_partitions(),
            histogram.line_size(),
        ));
    }

    let kernel = inputs.kernel();
    let base_grid = kernel.base_grid_shape();
    if base_grid.n_blocks() == 0 {
        trace!("no features or partitions, skipping the launch");
        return Ok(());
    }

    let pair_count = inputs.pairs().len();
    let blocks_per_feature = policy.blocks_per_feature(&base_grid, pair_count);
    let out = histogram.as_atomic_slice();

    macro_rules! launch {
        ($n:literal) => {{
            let grid = kernel.grid_shape($n);
            debug!(
                "launching {:?} pass: grid {:?} ({} blocks per feature group), {} pairs",
                kernel.pass, grid, $n, pair_count
            );
            executor.launch(&grid, &|block, scratch| {
                kernel.run_block::<$n>(block, scratch, out)
            });
        }};
    }

    match blocks_per_feature {
        1 => launch!(1),
        2 => launch!(2),
        4 => launch!(4),
        8 => launch!(8),
        16 => launch!(16),
        32 => launch!(32),
        64 => launch!(64),
        other => unsupported_multiplier(other, kernel),
    }
    Ok(())
}

#[cold]
fn unsupported_multiplier(blocks_per_feature: usize, kernel: &PairwiseHistKernel) -> ! {
    error!(
        "unsupported blocks-per-feature multiplier {} (grid {:?})",
        blocks_per_feature,
        kernel.base_grid_shape()
    );
    panic!("unsupported blocks-per-feature multiplier: {blocks_per_feature}")
}

/// add the pairwise histograms described by `inputs` to `histogram`, using
/// the backend & multiplier policy selected by `config`
pub fn compute_with_config(
    config: &HistConfig,
    inputs: &PairwiseHistInputs,
    histogram: &mut HistogramBuffer,
) -> Result<(), Error> {
    match config.parallelism {
        Parallelism::Serial => {
            let mut executor = SerialExecutor::new();
            compute_pairwise_histogram(&mut executor, &config.policy(1), inputs, histogram)
        }
        Parallelism::Rayon { n_threads } => {
            let mut executor = match n_threads {
                Some(n) => RayonExecutor::with_threads(n)?,
                None => RayonExecutor::new(),
            };
            let policy = config.policy(executor.n_threads());
            compute_pairwise_histogram(&mut executor, &policy, inputs, histogram)
        }
    }
}
