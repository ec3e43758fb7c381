// the reason this is named mod.rs has to do with some complexities of how
// testing is handled
//
// we are following the advice of the rust book
// https://doc.rust-lang.org/book/ch11-03-test-organization.html#submodules-in-integration-tests

use ndarray::Array2;
use pairhist::{
    CompressedIndex, DataPartition, DocPair, HistogramBuffer, PairwiseHistInputs, PassKind,
    naive_pairwise_histogram,
};
use rand::distr::{Distribution, Uniform};
use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::SeedableRng;

// based on numpy!
// https://numpy.org/doc/stable/reference/generated/numpy.isclose.html
pub fn isclose(actual: f32, ref_val: f32, rtol: f32, atol: f32) -> bool {
    let actual_nan = actual.is_nan();
    let ref_nan = ref_val.is_nan();
    if actual_nan || ref_nan {
        actual_nan && ref_nan
    } else {
        (actual - ref_val).abs() <= (atol + rtol * ref_val.abs())
    }
}

pub fn assert_all_close(actual: &[f32], ref_vals: &[f32], rtol: f32, atol: f32) {
    assert_eq!(actual.len(), ref_vals.len());
    for (i, (a, r)) in actual.iter().zip(ref_vals).enumerate() {
        assert!(
            isclose(*a, *r, rtol, atol),
            "mismatch at index {i}: actual = {a}, reference = {r}"
        );
    }
}

/// copy every line of the histogram into a single vector
pub fn flatten(hist: &HistogramBuffer) -> Vec<f32> {
    (0..hist.n_partitions())
        .flat_map(|p| hist.partition_line(p))
        .collect()
}

/// A randomly generated problem that owns all of its data
pub struct RandomProblem {
    pub index: CompressedIndex,
    pub pairs: Vec<DocPair>,
    pub weights: Vec<f32>,
    pub partitions: Vec<DataPartition>,
}

impl RandomProblem {
    /// Every weight is a small integer, so that sums are exact (and don't
    /// depend on the order of operations).
    pub fn new(
        seed: u64,
        n_features: usize,
        n_docs: usize,
        n_pairs: usize,
        n_partitions: usize,
    ) -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

        let fold_dist = Uniform::try_from(1..=15_usize).unwrap();
        let folds: Vec<usize> = (0..n_features).map(|_| fold_dist.sample(&mut rng)).collect();
        let mut bins = Array2::<u8>::zeros((n_features, n_docs));
        for (k, mut row) in bins.rows_mut().into_iter().enumerate() {
            // a feature with n folds has n + 1 bins
            let bin_dist = Uniform::try_from(0..=(folds[k] as u8)).unwrap();
            for x in row.iter_mut() {
                *x = bin_dist.sample(&mut rng);
            }
        }
        let index = CompressedIndex::from_bins(bins.view(), &folds).unwrap();

        let doc_dist = Uniform::try_from(0..(n_docs as u32)).unwrap();
        let weight_dist = Uniform::try_from(1..=4_i32).unwrap();
        let mut pairs = Vec::with_capacity(n_pairs);
        let mut weights = Vec::with_capacity(n_pairs);
        for _ in 0..n_pairs {
            pairs.push(DocPair::new(
                doc_dist.sample(&mut rng),
                doc_dist.sample(&mut rng),
            ));
            weights.push(weight_dist.sample(&mut rng) as f32);
        }

        let partitions = random_partitions(&mut rng, 0, n_pairs, n_partitions);

        Self {
            index,
            pairs,
            weights,
            partitions,
        }
    }

    pub fn inputs(&self, pass: PassKind) -> PairwiseHistInputs<'_> {
        self.inputs_for(&self.partitions, pass)
    }

    /// build inputs that use alternative partitions of the same pairs
    pub fn inputs_for<'a>(
        &'a self,
        partitions: &'a [DataPartition],
        pass: PassKind,
    ) -> PairwiseHistInputs<'a> {
        PairwiseHistInputs::new(
            self.index.features(),
            self.index.words(),
            &self.pairs,
            &self.weights,
            partitions,
            self.index.hist_line_size(),
            pass,
        )
        .unwrap()
    }

    pub fn empty_histogram(&self, n_partitions: usize) -> HistogramBuffer {
        HistogramBuffer::new(n_partitions, self.index.hist_line_size())
    }

    /// the reference result for `partitions` (every partition is computed)
    pub fn naive(&self, partitions: &[DataPartition]) -> Vec<f32> {
        let line_size = self.index.hist_line_size();
        let mut out = vec![0.0; partitions.len() * line_size * 4];
        naive_pairwise_histogram(
            self.index.features(),
            self.index.words(),
            &self.pairs,
            &self.weights,
            partitions,
            line_size,
            &mut out,
        )
        .unwrap();
        out
    }
}

/// split the pairs in `offset..offset + len` into `n` contiguous partitions
/// (some partitions may be empty)
pub fn random_partitions(
    rng: &mut Xoshiro256PlusPlus,
    offset: usize,
    len: usize,
    n: usize,
) -> Vec<DataPartition> {
    assert!(n > 0);
    let cut_dist = Uniform::try_from(0..=len).unwrap();
    let mut cuts: Vec<usize> = (0..(n - 1)).map(|_| cut_dist.sample(rng)).collect();
    cuts.push(0);
    cuts.push(len);
    cuts.sort();
    cuts.windows(2)
        .map(|w| DataPartition::new(offset + w[0], w[1] - w[0]))
        .collect()
}
