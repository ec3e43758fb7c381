use ndarray::{Array2, array};
use pairhist::{
    CompressedIndex, DataPartition, DocPair, FeatureDescr, FixedMultiplier, HistConfig,
    HistogramBuffer, MultiplierChoice, PairwiseHistInputs, PassKind, SerialExecutor,
    compute_pairwise_histogram, compute_with_config,
};
use rand::distr::{Distribution, Uniform};
use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::SeedableRng;

mod common;

use common::{assert_all_close, flatten};

#[test]
fn golden_scenario() {
    // 3 documents & 2 features: A = (1, 2), B = (2, 2), C = (0, 3)
    let bins: Array2<u8> = array![[1, 2, 0], [2, 2, 3]];
    let index = CompressedIndex::from_bins(bins.view(), &[4, 4]).unwrap();
    let [a, b, c] = [0, 1, 2];
    let pairs = [DocPair::new(a, b), DocPair::new(a, c), DocPair::new(b, c)];
    let weights = [1.0, 2.0, 1.0];
    let partitions = [DataPartition::new(0, 3)];
    let inputs = PairwiseHistInputs::new(
        index.features(),
        index.words(),
        &pairs,
        &weights,
        &partitions,
        index.hist_line_size(),
        PassKind::Full,
    )
    .unwrap();

    let mut hist = HistogramBuffer::new(1, 8);
    compute_with_config(&HistConfig::serial(), &inputs, &mut hist).unwrap();

    // [LEQ_A, LEQ_B, LEQ_BOTH, GREATER_BOTH] for folds 0..4 of each feature
    let expected: [[f32; 4]; 8] = [
        // feature 0
        [0.0, 3.0, 0.0, 1.0],
        [1.0, 1.0, 2.0, 0.0],
        [0.0, 0.0, 4.0, 0.0],
        [0.0, 0.0, 4.0, 0.0],
        // feature 1
        [0.0, 0.0, 0.0, 4.0],
        [0.0, 0.0, 0.0, 4.0],
        [3.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 4.0, 0.0],
    ];
    for (fold, buckets) in expected.iter().enumerate() {
        assert_eq!(
            hist.fold_stats(0, fold).as_array(),
            *buckets,
            "mismatch for global fold {fold}"
        );
    }
}

#[test]
fn single_feature_conservation() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(6482975);
    let n_docs = 200;
    let bin_dist = Uniform::try_from(0..16_u8).unwrap();
    let bins = Array2::from_shape_simple_fn((1, n_docs), || bin_dist.sample(&mut rng));
    let index = CompressedIndex::from_bins(bins.view(), &[16]).unwrap();

    let doc_dist = Uniform::try_from(0..(n_docs as u32)).unwrap();
    let pairs: Vec<DocPair> = (0..1000)
        .map(|_| DocPair::new(doc_dist.sample(&mut rng), doc_dist.sample(&mut rng)))
        .collect();
    let weights = vec![1.0_f32; 1000];
    let partitions = [DataPartition::new(0, 1000)];
    let inputs = PairwiseHistInputs::new(
        index.features(),
        index.words(),
        &pairs,
        &weights,
        &partitions,
        16,
        PassKind::Full,
    )
    .unwrap();

    for config in [
        HistConfig::serial(),
        HistConfig::default().with_multiplier(MultiplierChoice::Fixed(4)),
    ] {
        let mut hist = HistogramBuffer::new(1, 16);
        compute_with_config(&config, &inputs, &mut hist).unwrap();
        let mut sum_over_folds = 0.0;
        for fold in 0..16 {
            let total = hist.fold_stats(0, fold).total();
            assert_eq!(total, 1000.0, "fold {fold} isn't conserved");
            sum_over_folds += total;
        }
        assert_eq!(sum_over_folds, 16.0 * 1000.0);
        // every document lies at or below the final threshold
        assert_eq!(hist.fold_stats(0, 15).leq_both, 1000.0);
    }
}

#[test]
fn random_conservation() {
    let problem = common::RandomProblem::new(8451, 13, 300, 5000, 5);
    let inputs = problem.inputs(PassKind::Full);
    let mut hist = problem.empty_histogram(5);
    compute_with_config(&HistConfig::default(), &inputs, &mut hist).unwrap();

    for (p, partition) in problem.partitions.iter().enumerate() {
        let partition_weight: f32 = problem.weights[partition.offset..partition.end()]
            .iter()
            .sum();
        for feature in problem.index.features() {
            for fold in 0..feature.folds {
                let total = hist.fold_stats(p, feature.first_fold_index + fold).total();
                assert_eq!(total, partition_weight);
            }
        }
    }
}

#[test]
fn zero_size_partition() {
    let problem = common::RandomProblem::new(1234, 9, 50, 600, 1);
    let partitions = [
        DataPartition::new(0, 300),
        DataPartition::new(300, 0),
        DataPartition::new(300, 300),
    ];
    let inputs = problem.inputs_for(&partitions, PassKind::Full);
    let mut hist = problem.empty_histogram(3);
    compute_with_config(&HistConfig::serial(), &inputs, &mut hist).unwrap();
    assert!(hist.partition_line(1).iter().all(|x| *x == 0.0));
    assert!(hist.partition_line(0).iter().any(|x| *x != 0.0));
    assert_all_close(&flatten(&hist), &problem.naive(&partitions), 0.0, 0.0);
}

#[test]
fn no_work() {
    // no partitions
    let problem = common::RandomProblem::new(77, 4, 10, 20, 1);
    let inputs = problem.inputs_for(&[], PassKind::Full);
    let mut hist = problem.empty_histogram(0);
    compute_with_config(&HistConfig::serial(), &inputs, &mut hist).unwrap();

    // no features
    let one_pair = [DocPair::new(0, 0)];
    let partitions = [DataPartition::new(0, 1)];
    let inputs = PairwiseHistInputs::new(
        &[],
        &[],
        &one_pair,
        &[1.0],
        &partitions,
        0,
        PassKind::Full,
    )
    .unwrap();
    let mut hist = HistogramBuffer::new(1, 0);
    compute_with_config(&HistConfig::serial(), &inputs, &mut hist).unwrap();
}

fn feature(offset: usize, first_fold_index: usize, folds: usize) -> FeatureDescr {
    FeatureDescr {
        offset,
        first_fold_index,
        folds,
    }
}

#[test]
fn invalid_inputs() {
    let cindex = [0_u32; 8];
    let features = [feature(0, 0, 2), feature(0, 2, 2)];
    let pairs = [DocPair::new(0, 7), DocPair::new(3, 4)];
    let weights = [1.0, 1.0];
    let partitions = [DataPartition::new(0, 2)];
    let full = PassKind::Full;

    // sanity check
    assert!(
        PairwiseHistInputs::new(&features, &cindex, &pairs, &weights, &partitions, 4, full)
            .is_ok()
    );

    // weights length mismatch
    assert!(
        PairwiseHistInputs::new(&features, &cindex, &pairs, &[1.0], &partitions, 4, full).is_err()
    );

    // too many folds
    let bad_features = [feature(0, 0, 17)];
    assert!(
        PairwiseHistInputs::new(&bad_features, &cindex, &pairs, &weights, &partitions, 17, full)
            .is_err()
    );

    // features of a single group must share an offset
    let bad_features = [feature(0, 0, 2), feature(1, 2, 2)];
    assert!(
        PairwiseHistInputs::new(&bad_features, &cindex, &pairs, &weights, &partitions, 4, full)
            .is_err()
    );

    // 2 features that write to the same fold
    let bad_features = [feature(0, 0, 2), feature(0, 1, 2)];
    assert!(
        PairwiseHistInputs::new(&bad_features, &cindex, &pairs, &weights, &partitions, 4, full)
            .is_err()
    );

    // the histogram line is too short
    assert!(
        PairwiseHistInputs::new(&features, &cindex, &pairs, &weights, &partitions, 3, full)
            .is_err()
    );

    // partition extends beyond the pairs
    let bad_partitions = [DataPartition::new(1, 2)];
    assert!(
        PairwiseHistInputs::new(&features, &cindex, &pairs, &weights, &bad_partitions, 4, full)
            .is_err()
    );

    // a document without a word in the compressed index
    let bad_pairs = [DocPair::new(0, 8), DocPair::new(3, 4)];
    assert!(
        PairwiseHistInputs::new(&features, &cindex, &bad_pairs, &weights, &partitions, 4, full)
            .is_err()
    );

    // depth-split passes need quartets of partitions
    let split = PassKind::DepthSplit;
    assert!(
        PairwiseHistInputs::new(&features, &cindex, &pairs, &weights, &partitions, 4, split)
            .is_err()
    );
}

#[test]
fn histogram_shape_mismatch() {
    let problem = common::RandomProblem::new(99, 3, 10, 40, 2);
    let inputs = problem.inputs(PassKind::Full);
    let mut hist = problem.empty_histogram(3);
    let result = compute_pairwise_histogram(
        &mut SerialExecutor::new(),
        &FixedMultiplier(1),
        &inputs,
        &mut hist,
    );
    assert!(result.is_err());
    let mut hist = HistogramBuffer::new(2, 1);
    assert!(compute_with_config(&HistConfig::serial(), &inputs, &mut hist).is_err());
}
