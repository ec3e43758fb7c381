// The errors are split across 2 crates:
// - `pairhist_nostd_internal` reports problems as `&'static str`
// - this crate defines the public Error type and wraps those strings
//
// It is **MUCH** easier to eventually move the definitions into the internal
// crate than to go the other way.

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

/// The underlying internal error type
#[non_exhaustive]
#[derive(Clone, Debug)]
enum ErrorKind {
    /// An error that occurs when the feature descriptors are inconsistent
    /// with the half-byte packing scheme (or with each other)
    FeatureLayout(FeatureLayoutError),
    /// An error that occurs when the histogram buffer has the wrong shape
    HistogramShape(HistogramShapeError),
    /// An error that occurs when an integer lies outside of the acceptable
    /// range of values
    IntegerRange(IntegerRangeError),
    /// An error that occurs within `pairhist_nostd_internal`
    ///
    /// This wraps the stringly errors returned by `pairhist_nostd_internal`
    InternalLegacyAdHoc(InternalLegacyAdHocError),
    /// An error that occurs when a partition extends past the pair array
    PartitionRange(PartitionRangeError),
    /// An error that occurs when a dedicated thread pool can't be built
    ThreadPool(ThreadPoolError),
}

// define constructor methods for Error
impl Error {
    /// produce an error indicating that a feature descriptor is problematic
    pub(crate) fn feature_layout(feature_index: usize, what: &'static str) -> Self {
        Error {
            kind: ErrorKind::FeatureLayout(FeatureLayoutError {
                feature_index,
                what,
            }),
        }
    }

    /// produce an error indicating that the histogram has the wrong shape
    pub(crate) fn histogram_shape(
        expected_partitions: usize,
        expected_line_size: usize,
        actual_partitions: usize,
        actual_line_size: usize,
    ) -> Self {
        Error {
            kind: ErrorKind::HistogramShape(HistogramShapeError {
                expected_partitions,
                expected_line_size,
                actual_partitions,
                actual_line_size,
            }),
        }
    }

    /// produce an error indicating that an integer lies outside the acceptable
    /// range of values
    pub(crate) fn integer_range(
        description: &'static str,
        actual: i64,
        min_val: i64,
        max_val: i64,
    ) -> Self {
        Error {
            kind: ErrorKind::IntegerRange(IntegerRangeError {
                description,
                actual,
                min_val,
                max_val,
            }),
        }
    }

    /// wraps an internal error string
    pub(crate) fn internal_legacy_adhoc(message: &'static str) -> Self {
        Error {
            kind: ErrorKind::InternalLegacyAdHoc(InternalLegacyAdHocError(message)),
        }
    }

    /// produce an error indicating that a partition doesn't fit inside the
    /// pair array
    pub(crate) fn partition_range(
        partition_index: usize,
        offset: usize,
        size: usize,
        pair_count: usize,
    ) -> Self {
        Error {
            kind: ErrorKind::PartitionRange(PartitionRangeError {
                partition_index,
                offset,
                size,
                pair_count,
            }),
        }
    }

    /// produce an error indicating that building a thread pool failed
    pub(crate) fn thread_pool(err: rayon::ThreadPoolBuildError) -> Self {
        Error {
            kind: ErrorKind::ThreadPool(ThreadPoolError {
                what: err.to_string(),
            }),
        }
    }
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for ErrorKind {}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            ErrorKind::FeatureLayout(ref err) => err.fmt(f),
            ErrorKind::HistogramShape(ref err) => err.fmt(f),
            ErrorKind::IntegerRange(ref err) => err.fmt(f),
            ErrorKind::InternalLegacyAdHoc(ref msg) => msg.fmt(f),
            ErrorKind::PartitionRange(ref err) => err.fmt(f),
            ErrorKind::ThreadPool(ref err) => err.fmt(f),
        }
    }
}

/// An error that occurs when a feature descriptor is problematic
#[derive(Clone, Debug)]
struct FeatureLayoutError {
    feature_index: usize,
    what: &'static str,
}

impl std::error::Error for FeatureLayoutError {}

impl core::fmt::Display for FeatureLayoutError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "problem with the feature at index {}: {}",
            self.feature_index, self.what
        )
    }
}

/// An error that occurs when the histogram buffer has the wrong shape
#[derive(Clone, Debug)]
struct HistogramShapeError {
    expected_partitions: usize,
    expected_line_size: usize,
    actual_partitions: usize,
    actual_line_size: usize,
}

impl std::error::Error for HistogramShapeError {}

impl core::fmt::Display for HistogramShapeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "The histogram has {} partitions & each line holds {} folds. \
             It should have {} partitions, with {} folds per line",
            self.actual_partitions,
            self.actual_line_size,
            self.expected_partitions,
            self.expected_line_size
        )
    }
}

/// An error that occurs when an integer lies outside of the acceptable
/// range of values
#[derive(Clone, Debug)]
struct IntegerRangeError {
    description: &'static str,
    actual: i64,
    min_val: i64,
    max_val: i64,
}

impl std::error::Error for IntegerRangeError {}

impl core::fmt::Display for IntegerRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{} has a value of {}. The value should be no less than {} and \
             not exceed {}",
            self.description, self.actual, self.min_val, self.max_val
        )
    }
}

/// Wraps the string errors from `pairhist_nostd_internal`
#[derive(Clone)]
struct InternalLegacyAdHocError(&'static str);

impl std::error::Error for InternalLegacyAdHocError {}

impl core::fmt::Display for InternalLegacyAdHocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::fmt::Debug for InternalLegacyAdHocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.0, f)
    }
}

/// An error that occurs when a partition extends past the pair array
#[derive(Clone, Debug)]
struct PartitionRangeError {
    partition_index: usize,
    offset: usize,
    size: usize,
    pair_count: usize,
}

impl std::error::Error for PartitionRangeError {}

impl core::fmt::Display for PartitionRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "partition {} covers {} pairs starting at offset {}, but there \
             are only {} pairs",
            self.partition_index, self.size, self.offset, self.pair_count
        )
    }
}

/// An error that occurs when a dedicated thread pool can't be built
#[derive(Clone, Debug)]
struct ThreadPoolError {
    what: String,
}

impl std::error::Error for ThreadPoolError {}

impl core::fmt::Display for ThreadPoolError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "failed to build a thread pool: {}", self.what)
    }
}
