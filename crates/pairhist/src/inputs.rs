//! Validates the inputs of a histogram build (once, before any block runs)

use pairhist_nostd_internal::{
    DataPartition, DocPair, FEATURES_PER_WORD, FeatureDescr, PairwiseHistKernel, PassKind,
    check_features, check_partitions, required_hist_line_size,
};

use crate::error::Error;

/// The validated, read-only inputs of a histogram build
///
/// Constructing an instance checks every logical precondition of the
/// build:
/// - there is 1 weight per pair
/// - every feature has at most 16 folds, and each group of 8 features
///   shares a single compressed index offset
/// - no 2 features share a fold of the histogram line
/// - the histogram line is long enough to hold every feature's folds
/// - every partition lies within the pair array
/// - the compressed index holds a word for every document referenced by a
///   pair (in every feature group)
/// - a depth-split pass receives a multiple of 4 partitions
#[derive(Clone, Copy, Debug)]
pub struct PairwiseHistInputs<'a> {
    kernel: PairwiseHistKernel<'a>,
}

impl<'a> PairwiseHistInputs<'a> {
    pub fn new(
        features: &'a [FeatureDescr],
        cindex: &'a [u32],
        pairs: &'a [DocPair],
        weights: &'a [f32],
        partitions: &'a [DataPartition],
        hist_line_size: usize,
        pass: PassKind,
    ) -> Result<Self, Error> {
        if weights.len() != pairs.len() {
            return Err(Error::integer_range(
                "the number of weights",
                weights.len() as i64,
                pairs.len() as i64,
                pairs.len() as i64,
            ));
        }

        check_features(features).map_err(|(i, what)| Error::feature_layout(i, what))?;

        let min_line_size = required_hist_line_size(features);
        if hist_line_size < min_line_size {
            return Err(Error::integer_range(
                "hist_line_size",
                hist_line_size as i64,
                min_line_size as i64,
                i64::MAX,
            ));
        }

        check_partitions(partitions, pairs.len()).map_err(|i| {
            let p = partitions[i];
            Error::partition_range(i, p.offset, p.size, pairs.len())
        })?;

        if pass == PassKind::DepthSplit && partitions.len() % 4 != 0 {
            return Err(Error::integer_range(
                "the number of depth-split partitions modulo 4",
                (partitions.len() % 4) as i64,
                0,
                0,
            ));
        }

        if let Some(max_doc) = pairs.iter().map(|p| p.doc_a.max(p.doc_b)).max() {
            for group_start in (0..features.len()).step_by(FEATURES_PER_WORD) {
                let required_len = features[group_start].offset + (max_doc as usize) + 1;
                if cindex.len() < required_len {
                    return Err(Error::feature_layout(
                        group_start,
                        "the compressed index doesn't hold a word for every document \
                         referenced by a pair",
                    ));
                }
            }
        }

        Ok(Self {
            kernel: PairwiseHistKernel {
                features,
                cindex,
                pairs,
                weights,
                partitions,
                hist_line_size,
                pass,
            },
        })
    }

    pub fn features(&self) -> &'a [FeatureDescr] {
        self.kernel.features
    }

    pub fn pairs(&self) -> &'a [DocPair] {
        self.kernel.pairs
    }

    pub fn partitions(&self) -> &'a [DataPartition] {
        self.kernel.partitions
    }

    pub fn hist_line_size(&self) -> usize {
        self.kernel.hist_line_size
    }

    pub fn pass(&self) -> PassKind {
        self.kernel.pass
    }

    pub(crate) fn kernel(&self) -> &PairwiseHistKernel<'a> {
        &self.kernel
    }
}
