//! Defines the plain-old-data types that describe the inputs of a histogram
//! build.
//!
//! None of these types perform validation on construction. The
//! `check_*` functions validate collections of them once, before a launch,
//! so that the kernel never has to.

use crate::half_byte::{FEATURES_PER_WORD, MAX_FOLD_COUNT};

/// Describes a single half-byte feature
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureDescr {
    /// position of the feature group's column in the compressed index. The
    /// packed word of document `d` is found at `offset + d`.
    ///
    /// Every feature of a group shares the same offset. The feature's slot
    /// within the packed word is its index within the group.
    pub offset: usize,
    /// the index of the feature's first fold within a histogram line
    pub first_fold_index: usize,
    /// the number of folds (candidate thresholds)
    pub folds: usize,
}

/// A pair of documents, referenced by their rows in the compressed index
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocPair {
    pub doc_a: u32,
    pub doc_b: u32,
}

impl DocPair {
    pub fn new(doc_a: u32, doc_b: u32) -> Self {
        Self { doc_a, doc_b }
    }
}

/// A contiguous range of the pair array that belongs to a single tree node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DataPartition {
    pub offset: usize,
    pub size: usize,
}

impl DataPartition {
    pub fn new(offset: usize, size: usize) -> Self {
        Self { offset, size }
    }

    /// the index one past the partition's final pair
    pub fn end(&self) -> usize {
        self.offset + self.size
    }
}

/// the number of folds in a histogram line required by `features`
pub fn required_hist_line_size(features: &[FeatureDescr]) -> usize {
    features
        .iter()
        .map(|f| f.first_fold_index + f.folds)
        .max()
        .unwrap_or(0)
}

/// check that each feature's fold count fits the half-byte scheme, that
/// the features of each group of [`FEATURES_PER_WORD`] share an offset and
/// that no 2 features claim the same fold of a histogram line.
///
/// On failure, the index of the problematic feature is returned along with a
/// description.
pub fn check_features(features: &[FeatureDescr]) -> Result<(), (usize, &'static str)> {
    for (i, feature) in features.iter().enumerate() {
        if feature.folds > MAX_FOLD_COUNT {
            return Err((i, "a half-byte feature can't have more than 16 folds"));
        }
        let group_start = i - (i % FEATURES_PER_WORD);
        if feature.offset != features[group_start].offset {
            return Err((
                i,
                "every feature in a group of 8 must share the compressed index offset",
            ));
        }
        if features[..i].iter().any(|other| folds_overlap(feature, other)) {
            return Err((i, "the fold ranges of 2 features overlap"));
        }
    }
    Ok(())
}

fn folds_overlap(a: &FeatureDescr, b: &FeatureDescr) -> bool {
    a.folds > 0
        && b.folds > 0
        && a.first_fold_index < b.first_fold_index + b.folds
        && b.first_fold_index < a.first_fold_index + a.folds
}

/// check that every partition lies within a pair array of length
/// `pair_count`. On failure, the index of the first bad partition is returned.
pub fn check_partitions(partitions: &[DataPartition], pair_count: usize) -> Result<(), usize> {
    match partitions
        .iter()
        .position(|p| p.offset.checked_add(p.size).is_none_or(|end| end > pair_count))
    {
        Some(i) => Err(i),
        None => Ok(()),
    }
}
