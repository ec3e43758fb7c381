//! Helpers for working with "half-byte" (4-bit) feature packing.
//!
//! # Bit Layout
//! A single `u32` word of the compressed index holds the bins of up to
//! [`FEATURES_PER_WORD`] features for a single document. Each feature gets 4
//! bits. The feature in slot `k` occupies bits `(28 - 4k)..=(31 - 4k)`, so
//! slot 0 is the most significant nibble:
//!
//! ```text
//!  bit 31                                                        bit 0
//!  | slot 0 | slot 1 | slot 2 | slot 3 | slot 4 | slot 5 | slot 6 | slot 7 |
//! ```
//!
//! Unused slots (at the end of the last feature group) are expected to hold
//! zeros, but nothing depends on that since they are never read.

/// the number of features packed into a single word of the compressed index
pub const FEATURES_PER_WORD: usize = 8;

/// the number of bits used to encode a single bin
pub const BITS_PER_FEATURE: u32 = 4;

/// the number of distinct bin values representable in a half-byte
pub const MAX_BIN_COUNT: usize = 16;

/// the most folds that a single half-byte feature can have
pub const MAX_FOLD_COUNT: usize = 16;

const HALF_BYTE_MASK: u32 = (1 << BITS_PER_FEATURE) - 1;

/// the right-shift that moves the nibble of `slot` into the lowest 4 bits
#[inline(always)]
pub const fn half_byte_shift(slot: usize) -> u32 {
    (32 - BITS_PER_FEATURE) - BITS_PER_FEATURE * (slot as u32)
}

/// extract the bin stored in `slot` of `word`
#[inline(always)]
pub const fn extract_half_byte(word: u32, slot: usize) -> usize {
    ((word >> half_byte_shift(slot)) & HALF_BYTE_MASK) as usize
}

/// returns a copy of `word` where `slot` holds `bin`
///
/// Only the lowest 4 bits of `bin` are used.
#[inline(always)]
pub const fn insert_half_byte(word: u32, slot: usize, bin: u8) -> u32 {
    let shift = half_byte_shift(slot);
    (word & !(HALF_BYTE_MASK << shift)) | (((bin as u32) & HALF_BYTE_MASK) << shift)
}

/// pack the bins of up to [`FEATURES_PER_WORD`] features into a single word.
///
/// `bins[k]` is placed in slot `k`. Trailing slots are zero-filled.
pub fn pack_half_bytes(bins: &[u8]) -> Result<u32, &'static str> {
    if bins.len() > FEATURES_PER_WORD {
        return Err("a word can't hold the bins of more than 8 features");
    }
    let mut word = 0_u32;
    for (slot, bin) in bins.iter().cloned().enumerate() {
        if (bin as usize) >= MAX_BIN_COUNT {
            return Err("a bin value doesn't fit within 4 bits");
        }
        word = insert_half_byte(word, slot, bin);
    }
    Ok(word)
}

/// the number of feature groups (i.e. packed words per document) needed to
/// hold `n_features` features
#[inline(always)]
pub const fn feature_group_count(n_features: usize) -> usize {
    n_features.div_ceil(FEATURES_PER_WORD)
}
