//! Builds the compressed index from per-feature bins

use ndarray::ArrayView2;
use pairhist_nostd_internal::{
    FEATURES_PER_WORD, FeatureDescr, MAX_FOLD_COUNT, feature_group_count, pack_half_bytes,
};

use crate::error::Error;

/// A compressed index of half-byte features, along with the descriptors of
/// those features
///
/// The words of feature group `g` occupy the column
/// `words[g * n_docs..(g + 1) * n_docs]`, so the descriptors of group `g`
/// share the offset `g * n_docs`. The folds of the features are laid out
/// consecutively within a histogram line, in feature order.
#[derive(Clone, Debug)]
pub struct CompressedIndex {
    words: Vec<u32>,
    features: Vec<FeatureDescr>,
    n_docs: usize,
}

impl CompressedIndex {
    /// pack `bins`, which has the shape `(n_features, n_docs)`.
    ///
    /// `folds[k]` specifies the number of folds of feature `k`.
    pub fn from_bins(bins: ArrayView2<u8>, folds: &[usize]) -> Result<Self, Error> {
        let [n_features, n_docs] = [bins.shape()[0], bins.shape()[1]];
        if folds.len() != n_features {
            return Err(Error::integer_range(
                "the length of folds",
                folds.len() as i64,
                n_features as i64,
                n_features as i64,
            ));
        }

        let mut features = Vec::with_capacity(n_features);
        let mut first_fold_index = 0;
        for (k, n_folds) in folds.iter().cloned().enumerate() {
            if n_folds > MAX_FOLD_COUNT {
                return Err(Error::integer_range(
                    "the number of folds of a feature",
                    n_folds as i64,
                    0,
                    MAX_FOLD_COUNT as i64,
                ));
            }
            features.push(FeatureDescr {
                offset: (k / FEATURES_PER_WORD) * n_docs,
                first_fold_index,
                folds: n_folds,
            });
            first_fold_index += n_folds;
        }

        let n_groups = feature_group_count(n_features);
        let mut words = Vec::with_capacity(n_groups * n_docs);
        let mut buf = [0_u8; FEATURES_PER_WORD];
        for group in 0..n_groups {
            let group_start = group * FEATURES_PER_WORD;
            let n_active = (n_features - group_start).min(FEATURES_PER_WORD);
            for doc in 0..n_docs {
                for (slot, dst) in buf[..n_active].iter_mut().enumerate() {
                    *dst = bins[[group_start + slot, doc]];
                }
                let word =
                    pack_half_bytes(&buf[..n_active]).map_err(Error::internal_legacy_adhoc)?;
                words.push(word);
            }
        }

        Ok(Self {
            words,
            features,
            n_docs,
        })
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn features(&self) -> &[FeatureDescr] {
        &self.features
    }

    pub fn n_docs(&self) -> usize {
        self.n_docs
    }

    /// the number of folds in a histogram line that holds every feature
    pub fn hist_line_size(&self) -> usize {
        self.features.iter().map(|f| f.folds).sum()
    }
}
