//! A direct reference implementation of the histogram build
//!
//! This visits every (partition, pair, feature, fold) combination and
//! classifies the pair on the spot. It's far too slow for real use, but it
//! shares no code with the scratchpad-based machinery, so it is useful for
//! cross-checking.

use crate::half_byte::{FEATURES_PER_WORD, extract_half_byte};
use crate::layout::{DataPartition, DocPair, FeatureDescr};
use crate::reduction::{GREATER_BOTH, LEQ_A, LEQ_B, LEQ_BOTH};
use crate::scratch::BUCKETS_PER_FOLD;

/// determine the bucket that a pair with bins `bin_a` & `bin_b` lands in for
/// fold `fold`
#[inline(always)]
pub fn classify_pair(bin_a: usize, bin_b: usize, fold: usize) -> usize {
    match (bin_a <= fold, bin_b <= fold) {
        (true, false) => LEQ_A,
        (false, true) => LEQ_B,
        (true, true) => LEQ_BOTH,
        (false, false) => GREATER_BOTH,
    }
}

/// add the histogram of every partition to `out`
///
/// `out` uses the same layout as the global histogram (a line of
/// `hist_line_size` folds per partition, 4 floats per fold). Unlike the
/// kernel, this always computes every partition.
pub fn naive_pairwise_histogram(
    features: &[FeatureDescr],
    cindex: &[u32],
    pairs: &[DocPair],
    weights: &[f32],
    partitions: &[DataPartition],
    hist_line_size: usize,
    out: &mut [f32],
) -> Result<(), &'static str> {
    if out.len() != partitions.len() * hist_line_size * BUCKETS_PER_FOLD {
        return Err("out has the wrong length");
    } else if weights.len() != pairs.len() {
        return Err("weights and pairs must have the same length");
    }

    for (partition_index, partition) in partitions.iter().enumerate() {
        let line = &mut out[partition_index * hist_line_size * BUCKETS_PER_FOLD..]
            [..hist_line_size * BUCKETS_PER_FOLD];
        for i in partition.offset..partition.end() {
            let pair = pairs[i];
            for (feature_index, feature) in features.iter().enumerate() {
                let slot = feature_index % FEATURES_PER_WORD;
                let bin_a = extract_half_byte(cindex[feature.offset + pair.doc_a as usize], slot);
                let bin_b = extract_half_byte(cindex[feature.offset + pair.doc_b as usize], slot);
                for fold in 0..feature.folds {
                    let bucket = classify_pair(bin_a, bin_b, fold);
                    line[BUCKETS_PER_FOLD * (feature.first_fold_index + fold) + bucket] +=
                        weights[i];
                }
            }
        }
    }
    Ok(())
}
