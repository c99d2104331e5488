use crate::types::{ClassCode, ClassImage, CompareError, CompareResult};
use num_traits::PrimInt;
use std::collections::BTreeMap;

/// Unique values of a thematic layer together with their occurrence counts.
///
/// Codes are kept in ascending order so that downstream tabulation and
/// report output are deterministic across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    codes: Vec<ClassCode>,
    counts: Vec<u64>,
}

impl FrequencyTable {
    /// Tabulate a flattened sample vector.
    ///
    /// Accepts any primitive integer sample type that widens losslessly into
    /// [`ClassCode`] (8-bit classification channels, 32-bit site-ID channels).
    pub fn from_samples<T>(samples: &[T]) -> Self
    where
        T: PrimInt + Into<ClassCode>,
    {
        Self::from_codes(samples.iter().map(|&s| s.into()))
    }

    /// Tabulate a 2D thematic channel without materializing a flattened copy.
    pub fn from_image(image: &ClassImage) -> Self {
        Self::from_codes(image.iter().map(|&s| ClassCode::from(s)))
    }

    fn from_codes<I>(codes: I) -> Self
    where
        I: IntoIterator<Item = ClassCode>,
    {
        let mut histogram: BTreeMap<ClassCode, u64> = BTreeMap::new();
        for code in codes {
            *histogram.entry(code).or_insert(0) += 1;
        }

        // BTreeMap iterates in ascending key order
        let (codes, counts) = histogram.into_iter().unzip();
        Self { codes, counts }
    }

    /// Distinct codes in ascending order
    pub fn codes(&self) -> &[ClassCode] {
        &self.codes
    }

    /// Occurrence counts, parallel to `codes()`
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Number of distinct codes
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Total number of tabulated samples
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Count for a single code (0 when the code never occurs)
    pub fn count_of(&self, code: ClassCode) -> u64 {
        match self.codes.binary_search(&code) {
            Ok(idx) => self.counts[idx],
            Err(_) => 0,
        }
    }

    /// Iterate `(code, count)` pairs in ascending code order
    pub fn iter(&self) -> impl Iterator<Item = (ClassCode, u64)> + '_ {
        self.codes.iter().copied().zip(self.counts.iter().copied())
    }
}

/// Check that two independently tabulated layers cover the same number of
/// samples. A disagreement after NoData filtering means the layers carry
/// inconsistent NoData patterns and the cross-tabulation would be misaligned.
pub fn verify_totals(left: &FrequencyTable, right: &FrequencyTable) -> CompareResult<()> {
    let left_total = left.total();
    let right_total = right.total();
    if left_total != right_total {
        return Err(CompareError::SumMismatch {
            left: left_total,
            right: right_total,
        });
    }
    Ok(())
}
