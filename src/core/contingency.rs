use crate::types::{ClassCode, CompareError, CompareResult};
use ndarray::{Array2, ArrayView1};
use std::collections::{BTreeMap, BTreeSet};

/// Joint label spans up to this many cells are tabulated through a flat
/// direct-indexed accumulator; anything wider goes through a keyed histogram.
const DIRECT_INDEX_CELL_LIMIT: i128 = 4096;

/// Dense cross-tabulation of two aligned categorical layers.
///
/// Rows are the distinct codes of the left layer, columns the distinct codes
/// of the right layer, both ascending. Cells count co-occurrences; pairs the
/// data never produced are explicit zeros. Codes with no samples at all get
/// no row or column.
#[derive(Debug, Clone, PartialEq)]
pub struct ContingencyMatrix {
    row_labels: Vec<ClassCode>,
    col_labels: Vec<ClassCode>,
    counts: Array2<u64>,
    row_totals: Vec<u64>,
    grand_total: u64,
}

impl ContingencyMatrix {
    /// Cross-tabulate two aligned sample vectors.
    ///
    /// One pass over the pairs builds a `(left, right)` histogram which is
    /// then projected onto the dense label grid, so the cost stays linear in
    /// the sample count for any class cardinality.
    pub fn build(left: &[ClassCode], right: &[ClassCode]) -> CompareResult<Self> {
        if left.len() != right.len() {
            return Err(CompareError::ShapeMismatch {
                left: left.len(),
                right: right.len(),
            });
        }
        if left.is_empty() {
            return Err(CompareError::EmptyInput {
                total: 0,
                removed: 0,
            });
        }

        let (lmin, lmax) = min_max(left);
        let (rmin, rmax) = min_max(right);
        let lspan = (lmax as i128 - lmin as i128) + 1;
        let rspan = (rmax as i128 - rmin as i128) + 1;
        let direct = lspan
            .checked_mul(rspan)
            .map_or(false, |cells| cells <= DIRECT_INDEX_CELL_LIMIT);

        let (row_labels, col_labels, counts) = if direct {
            tabulate_direct(left, right, lmin, rmin, lspan as usize, rspan as usize)
        } else {
            tabulate_hashed(left, right)
        };

        let row_totals: Vec<u64> = counts.rows().into_iter().map(|row| row.sum()).collect();
        let grand_total = row_totals.iter().sum();

        log::debug!(
            "contingency matrix: {} rows x {} columns over {} samples",
            row_labels.len(),
            col_labels.len(),
            grand_total
        );

        Ok(Self {
            row_labels,
            col_labels,
            counts,
            row_totals,
            grand_total,
        })
    }

    /// Distinct left-layer codes, ascending
    pub fn row_labels(&self) -> &[ClassCode] {
        &self.row_labels
    }

    /// Distinct right-layer codes, ascending
    pub fn col_labels(&self) -> &[ClassCode] {
        &self.col_labels
    }

    pub fn n_rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_labels.len()
    }

    /// Full dense count grid (rows x columns)
    pub fn counts(&self) -> &Array2<u64> {
        &self.counts
    }

    /// One dense row of counts
    pub fn row(&self, row: usize) -> ArrayView1<'_, u64> {
        self.counts.row(row)
    }

    /// Count for a specific code pair; 0 when either code has no label
    pub fn cell(&self, code_left: ClassCode, code_right: ClassCode) -> u64 {
        match (
            self.row_labels.binary_search(&code_left),
            self.col_labels.binary_search(&code_right),
        ) {
            (Ok(i), Ok(j)) => self.counts[[i, j]],
            _ => 0,
        }
    }

    /// Sample count of one row (equals the left layer's frequency for that code)
    pub fn row_total(&self, row: usize) -> u64 {
        self.row_totals[row]
    }

    pub fn row_totals(&self) -> &[u64] {
        &self.row_totals
    }

    /// Total number of tabulated samples
    pub fn grand_total(&self) -> u64 {
        self.grand_total
    }

    /// Row cells as percentages of the row total, rounded to 2 decimals.
    /// A row with no samples reports 0.0 everywhere instead of dividing by zero.
    pub fn row_percentages(&self, row: usize) -> Vec<f64> {
        let total = self.row_totals[row];
        self.counts
            .row(row)
            .iter()
            .map(|&count| {
                if total == 0 {
                    0.0
                } else {
                    let pct = (count as f64 / total as f64) * 100.0;
                    (pct * 100.0).round() / 100.0
                }
            })
            .collect()
    }

    /// Nonzero cells of one row as ascending `(code, count)` pairs
    pub fn sparse_row(&self, row: usize) -> Vec<(ClassCode, u64)> {
        self.col_labels
            .iter()
            .zip(self.counts.row(row))
            .filter(|(_, &count)| count != 0)
            .map(|(&code, &count)| (code, count))
            .collect()
    }
}

fn min_max(values: &[ClassCode]) -> (ClassCode, ClassCode) {
    let mut min = values[0];
    let mut max = values[0];
    for &v in &values[1..] {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    (min, max)
}

fn tabulate_direct(
    left: &[ClassCode],
    right: &[ClassCode],
    lmin: ClassCode,
    rmin: ClassCode,
    lspan: usize,
    rspan: usize,
) -> (Vec<ClassCode>, Vec<ClassCode>, Array2<u64>) {
    let mut flat = vec![0u64; lspan * rspan];
    for (&l, &r) in left.iter().zip(right.iter()) {
        flat[(l - lmin) as usize * rspan + (r - rmin) as usize] += 1;
    }

    let row_offsets: Vec<usize> = (0..lspan)
        .filter(|&li| flat[li * rspan..(li + 1) * rspan].iter().any(|&c| c != 0))
        .collect();
    let col_offsets: Vec<usize> = (0..rspan)
        .filter(|&ri| (0..lspan).any(|li| flat[li * rspan + ri] != 0))
        .collect();

    let row_labels: Vec<ClassCode> = row_offsets.iter().map(|&li| lmin + li as ClassCode).collect();
    let col_labels: Vec<ClassCode> = col_offsets.iter().map(|&ri| rmin + ri as ClassCode).collect();

    let mut counts = Array2::zeros((row_labels.len(), col_labels.len()));
    for (i, &li) in row_offsets.iter().enumerate() {
        for (j, &ri) in col_offsets.iter().enumerate() {
            counts[[i, j]] = flat[li * rspan + ri];
        }
    }

    (row_labels, col_labels, counts)
}

fn tabulate_hashed(
    left: &[ClassCode],
    right: &[ClassCode],
) -> (Vec<ClassCode>, Vec<ClassCode>, Array2<u64>) {
    let mut histogram: BTreeMap<(ClassCode, ClassCode), u64> = BTreeMap::new();
    for (&l, &r) in left.iter().zip(right.iter()) {
        *histogram.entry((l, r)).or_insert(0) += 1;
    }

    let mut row_set: BTreeSet<ClassCode> = BTreeSet::new();
    let mut col_set: BTreeSet<ClassCode> = BTreeSet::new();
    for &(l, r) in histogram.keys() {
        row_set.insert(l);
        col_set.insert(r);
    }
    let row_labels: Vec<ClassCode> = row_set.into_iter().collect();
    let col_labels: Vec<ClassCode> = col_set.into_iter().collect();

    let row_index: BTreeMap<ClassCode, usize> =
        row_labels.iter().enumerate().map(|(i, &c)| (c, i)).collect();
    let col_index: BTreeMap<ClassCode, usize> =
        col_labels.iter().enumerate().map(|(j, &c)| (c, j)).collect();

    let mut counts = Array2::zeros((row_labels.len(), col_labels.len()));
    for ((l, r), count) in histogram {
        if let (Some(&i), Some(&j)) = (row_index.get(&l), col_index.get(&r)) {
            counts[[i, j]] = count;
        }
    }

    (row_labels, col_labels, counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_rows_with_explicit_zeros() {
        let left = vec![1, 1, 2, 2, 2];
        let right = vec![5, 6, 5, 5, 7];

        let matrix = ContingencyMatrix::build(&left, &right).unwrap();

        assert_eq!(matrix.row_labels(), &[1, 2]);
        assert_eq!(matrix.col_labels(), &[5, 6, 7]);

        assert_eq!(matrix.row(0).to_vec(), vec![1, 1, 0]);
        assert_eq!(matrix.row(1).to_vec(), vec![2, 0, 1]);
        assert_eq!(matrix.cell(1, 7), 0);
        assert_eq!(matrix.cell(2, 5), 2);

        assert_eq!(matrix.row_total(0), 2);
        assert_eq!(matrix.row_total(1), 3);
        assert_eq!(matrix.grand_total(), 5);
    }

    #[test]
    fn test_row_percentages_round_to_two_decimals() {
        let left = vec![1, 1, 2, 2, 2];
        let right = vec![5, 6, 5, 5, 7];

        let matrix = ContingencyMatrix::build(&left, &right).unwrap();

        assert_eq!(matrix.row_percentages(0), vec![50.0, 50.0, 0.0]);
        assert_eq!(matrix.row_percentages(1), vec![66.67, 0.0, 33.33]);
    }

    #[test]
    fn test_shape_mismatch() {
        let left = vec![1, 2, 3, 4];
        let right = vec![1, 2, 3, 4, 5];

        match ContingencyMatrix::build(&left, &right) {
            Err(CompareError::ShapeMismatch { left: 4, right: 5 }) => {}
            other => panic!("expected ShapeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input() {
        let result = ContingencyMatrix::build(&[], &[]);
        assert!(matches!(result, Err(CompareError::EmptyInput { .. })));
    }

    #[test]
    fn test_wide_code_range_uses_hashed_path() {
        // spans far beyond the direct-index limit
        let left = vec![-1_000_000, -1_000_000, 2_000_000, 2_000_000];
        let right = vec![3, 900_000, 3, 3];

        let matrix = ContingencyMatrix::build(&left, &right).unwrap();

        assert_eq!(matrix.row_labels(), &[-1_000_000, 2_000_000]);
        assert_eq!(matrix.col_labels(), &[3, 900_000]);
        assert_eq!(matrix.row(0).to_vec(), vec![1, 1]);
        assert_eq!(matrix.row(1).to_vec(), vec![2, 0]);
        assert_eq!(matrix.grand_total(), 4);
    }

    #[test]
    fn test_sparse_row_skips_zero_cells() {
        let left = vec![1, 1, 2];
        let right = vec![5, 6, 6];

        let matrix = ContingencyMatrix::build(&left, &right).unwrap();

        assert_eq!(matrix.sparse_row(0), vec![(5, 1), (6, 1)]);
        assert_eq!(matrix.sparse_row(1), vec![(6, 1)]);
    }

    #[test]
    fn test_cell_sum_equals_sample_count() {
        let left: Vec<ClassCode> = (0..1000).map(|i| i % 7).collect();
        let right: Vec<ClassCode> = (0..1000).map(|i| (i * 3) % 5).collect();

        let matrix = ContingencyMatrix::build(&left, &right).unwrap();

        let cell_sum: u64 = matrix.counts().iter().sum();
        assert_eq!(cell_sum, 1000);
        assert_eq!(matrix.grand_total(), 1000);

        for row in 0..matrix.n_rows() {
            let row_sum: u64 = matrix.row(row).iter().sum();
            assert_eq!(row_sum, matrix.row_total(row));

            let pct_sum: f64 = matrix.row_percentages(row).iter().sum();
            let tolerance = 0.01 * matrix.n_cols() as f64;
            assert!(
                (pct_sum - 100.0).abs() <= tolerance,
                "row {} percentages sum to {}",
                row,
                pct_sum
            );
        }
    }
}
