//! Owns the global histogram that blocks merge their results into

use ndarray::Array3;
use pairhist_nostd_internal::{
    AtomicF32, BUCKETS_PER_FOLD, GREATER_BOTH, LEQ_A, LEQ_B, LEQ_BOTH, PassKind,
};

use crate::error::Error;

/// The 4 weighted pair counts tracked for a single fold
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FoldStats {
    /// only document A lies at or below the threshold
    pub leq_a: f32,
    /// only document B lies at or below the threshold
    pub leq_b: f32,
    /// both documents lie at or below the threshold
    pub leq_both: f32,
    /// both documents lie above the threshold
    pub greater_both: f32,
}

impl FoldStats {
    fn from_buckets(buckets: &[f32]) -> Self {
        Self {
            leq_a: buckets[LEQ_A],
            leq_b: buckets[LEQ_B],
            leq_both: buckets[LEQ_BOTH],
            greater_both: buckets[GREATER_BOTH],
        }
    }

    /// the buckets in their storage order
    pub fn as_array(&self) -> [f32; BUCKETS_PER_FOLD] {
        let mut out = [0.0; BUCKETS_PER_FOLD];
        out[LEQ_A] = self.leq_a;
        out[LEQ_B] = self.leq_b;
        out[LEQ_BOTH] = self.leq_both;
        out[GREATER_BOTH] = self.greater_both;
        out
    }

    /// the total weight of the pairs
    pub fn total(&self) -> f32 {
        self.leq_a + self.leq_b + self.leq_both + self.greater_both
    }
}

/// A flat histogram with one line of `line_size` folds per partition and 4
/// floats per fold
///
/// The buffer may only be mutated through addition while a build is running.
/// It is zeroed on construction.
pub struct HistogramBuffer {
    n_partitions: usize,
    line_size: usize,
    data: Vec<AtomicF32>,
}

impl HistogramBuffer {
    pub fn new(n_partitions: usize, line_size: usize) -> Self {
        let len = n_partitions * line_size * BUCKETS_PER_FOLD;
        Self {
            n_partitions,
            line_size,
            data: (0..len).map(|_| AtomicF32::default()).collect(),
        }
    }

    pub fn n_partitions(&self) -> usize {
        self.n_partitions
    }

    /// the number of folds in each line
    pub fn line_size(&self) -> usize {
        self.line_size
    }

    /// zero every entry (callers must do this before reusing the buffer)
    pub fn reset(&mut self) {
        for x in self.data.iter() {
            x.store(0.0);
        }
    }

    pub(crate) fn as_atomic_slice(&self) -> &[AtomicF32] {
        &self.data
    }

    /// load a single entry
    ///
    /// # Panics
    /// Panics if any index is out of bounds.
    pub fn get(&self, partition: usize, fold: usize, bucket: usize) -> f32 {
        assert!(partition < self.n_partitions && fold < self.line_size);
        assert!(bucket < BUCKETS_PER_FOLD);
        self.data[self.flat_index(partition, fold) + bucket].load()
    }

    pub fn fold_stats(&self, partition: usize, fold: usize) -> FoldStats {
        assert!(partition < self.n_partitions && fold < self.line_size);
        let start = self.flat_index(partition, fold);
        let mut buckets = [0.0; BUCKETS_PER_FOLD];
        for (dst, src) in buckets.iter_mut().zip(&self.data[start..]) {
            *dst = src.load();
        }
        FoldStats::from_buckets(&buckets)
    }

    /// copy out the line of a single partition (`4 * line_size` floats)
    pub fn partition_line(&self, partition: usize) -> Vec<f32> {
        assert!(partition < self.n_partitions);
        let start = self.flat_index(partition, 0);
        self.data[start..start + self.line_size * BUCKETS_PER_FOLD]
            .iter()
            .map(AtomicF32::load)
            .collect()
    }

    /// copy the buffer into an array of shape
    /// `[n_partitions, line_size, 4]`
    pub fn to_array(&self) -> Array3<f32> {
        Array3::from_shape_fn(
            (self.n_partitions, self.line_size, BUCKETS_PER_FOLD),
            |(partition, fold, bucket)| {
                self.data[self.flat_index(partition, fold) + bucket].load()
            },
        )
    }

    /// fill in the partitions skipped by a depth-split pass.
    ///
    /// Partition `4g` is overwritten with the difference between line `g` of
    /// `parent` and partitions `4g + 1`, `4g + 2` & `4g + 3`.
    pub fn restore_skipped_partitions(&mut self, parent: &HistogramBuffer) -> Result<(), Error> {
        if self.n_partitions % 4 != 0 {
            return Err(Error::integer_range(
                "the number of depth-split partitions modulo 4",
                (self.n_partitions % 4) as i64,
                0,
                0,
            ));
        } else if parent.n_partitions != self.n_partitions / 4 || parent.line_size != self.line_size
        {
            return Err(Error::histogram_shape(
                self.n_partitions / 4,
                self.line_size,
                parent.n_partitions,
                parent.line_size,
            ));
        }

        let pass = PassKind::DepthSplit;
        let line_len = self.line_size * BUCKETS_PER_FOLD;
        fn line(data: &[AtomicF32], line_len: usize, p: usize) -> &[AtomicF32] {
            &data[p * line_len..(p + 1) * line_len]
        }
        for skipped in (0..self.n_partitions).filter(|p| pass.skips_partition(*p)) {
            // the skipped partition shares grid row `g` with its 3 siblings
            let g = skipped / 4;
            let parent_line = line(&parent.data, line_len, g);
            for (i, dst) in line(&self.data, line_len, skipped).iter().enumerate() {
                let mut value = parent_line[i].load();
                for z in 0..3 {
                    value -= line(&self.data, line_len, pass.partition_index(g, z))[i].load();
                }
                dst.store(value);
            }
        }
        Ok(())
    }

    fn flat_index(&self, partition: usize, fold: usize) -> usize {
        (partition * self.line_size + fold) * BUCKETS_PER_FOLD
    }
}

impl core::fmt::Debug for HistogramBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("HistogramBuffer")
            .field("n_partitions", &self.n_partitions)
            .field("line_size", &self.line_size)
            .finish_non_exhaustive()
    }
}
