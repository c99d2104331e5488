use rastertab::{CompareError, ContingencyMatrix};

#[test]
fn test_reference_cross_tabulation() {
    let a = vec![1, 1, 2, 2, 2];
    let b = vec![5, 6, 5, 5, 7];

    let matrix = ContingencyMatrix::build(&a, &b).expect("matrix");

    assert_eq!(matrix.row_labels(), &[1, 2]);
    assert_eq!(matrix.col_labels(), &[5, 6, 7]);

    assert_eq!(matrix.row(0).to_vec(), vec![1, 1, 0]);
    assert_eq!(matrix.row_percentages(0), vec![50.0, 50.0, 0.0]);

    assert_eq!(matrix.row(1).to_vec(), vec![2, 0, 1]);
    assert_eq!(matrix.row_percentages(1), vec![66.67, 0.0, 33.33]);
}

#[test]
fn test_matrix_totals_reconcile() {
    // pseudo-random but deterministic class pattern
    let a: Vec<i64> = (0..10_000).map(|i| (i * 37 + 11) % 13).collect();
    let b: Vec<i64> = (0..10_000).map(|i| (i * 17 + 5) % 8).collect();

    let matrix = ContingencyMatrix::build(&a, &b).expect("matrix");

    let cell_sum: u64 = matrix.counts().iter().sum();
    assert_eq!(cell_sum, 10_000);
    assert_eq!(matrix.grand_total(), 10_000);

    for row in 0..matrix.n_rows() {
        let row_sum: u64 = matrix.row(row).iter().sum();
        assert_eq!(row_sum, matrix.row_total(row));

        let pct_sum: f64 = matrix.row_percentages(row).iter().sum();
        assert!((pct_sum - 100.0).abs() <= 0.01 * matrix.n_cols() as f64);
    }
}

#[test]
fn test_shape_mismatch_is_fatal() {
    let a = vec![1, 2, 3, 4];
    let b = vec![1, 2, 3, 4, 5];

    match ContingencyMatrix::build(&a, &b) {
        Err(CompareError::ShapeMismatch { left: 4, right: 5 }) => {}
        other => panic!("expected ShapeMismatch, got {:?}", other),
    }
}

#[test]
fn test_empty_input_is_fatal() {
    assert!(matches!(
        ContingencyMatrix::build(&[], &[]),
        Err(CompareError::EmptyInput { .. })
    ));
}

#[test]
fn test_both_cardinality_regimes_agree() {
    // same co-occurrence structure, once with compact codes and once with
    // codes spread far beyond the direct-index span
    let a_small = vec![1, 1, 2, 2, 3];
    let b_small = vec![4, 5, 4, 4, 5];

    let spread = 1_000_000;
    let a_wide: Vec<i64> = a_small.iter().map(|&v| v * spread).collect();
    let b_wide: Vec<i64> = b_small.iter().map(|&v| v * spread).collect();

    let small = ContingencyMatrix::build(&a_small, &b_small).expect("small matrix");
    let wide = ContingencyMatrix::build(&a_wide, &b_wide).expect("wide matrix");

    assert_eq!(small.n_rows(), wide.n_rows());
    assert_eq!(small.n_cols(), wide.n_cols());
    assert_eq!(small.counts(), wide.counts());
    for row in 0..small.n_rows() {
        assert_eq!(small.row_percentages(row), wide.row_percentages(row));
    }
}
