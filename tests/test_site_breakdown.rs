use rastertab::{site_report, CompareConfig, ComparisonProcessor, NoDataPolicy};

fn processor() -> ComparisonProcessor {
    let config = CompareConfig {
        nodata_value: Some(0),
        nodata_policy: NoDataPolicy::FilterByLeft,
        output_path: None,
    };
    ComparisonProcessor::new(config).expect("valid config")
}

#[test]
fn test_per_site_class_counts_are_sparse() {
    // 32-bit site IDs against an 8-bit-style classification
    let sites: Vec<i32> = vec![0, 101, 101, 101, 205, 205];
    let classes: Vec<i32> = vec![9, 1, 1, 2, 2, 2];

    let breakdown = processor()
        .site_breakdown(&sites, &classes)
        .expect("breakdown");

    assert_eq!(breakdown.site_frequencies.codes(), &[101, 205]);
    assert_eq!(breakdown.site_frequencies.counts(), &[3, 2]);

    assert_eq!(breakdown.rows.len(), 2);

    let first = &breakdown.rows[0];
    assert_eq!(first.site_id, 101);
    assert_eq!(first.n_items(), 2);
    assert_eq!(first.classes, vec![(1, 2), (2, 1)]);

    // class 1 never occurs inside site 205 and is not listed for it
    let second = &breakdown.rows[1];
    assert_eq!(second.site_id, 205);
    assert_eq!(second.n_items(), 1);
    assert_eq!(second.classes, vec![(2, 2)]);
}

#[test]
fn test_site_report_lines() {
    let sites: Vec<i32> = vec![0, 101, 101, 101, 205, 205];
    let classes: Vec<i32> = vec![9, 1, 1, 2, 2, 2];

    let breakdown = processor()
        .site_breakdown(&sites, &classes)
        .expect("breakdown");
    let report = site_report(&breakdown);

    let text = report.to_delimited();
    assert!(text.starts_with("Site IDs;2\n"));
    assert!(text.contains("101;2;1;2;2;1\n"));
    assert!(text.contains("205;1;2;2\n"));
}

#[test]
fn test_site_ids_far_apart_stay_linear() {
    // IDs spread over millions force the keyed-histogram path
    let sites: Vec<i32> = (0..50_000)
        .map(|i| 1_000_000 + (i % 500) * 10_000)
        .collect();
    let classes: Vec<i32> = (0..50_000).map(|i| (i % 7) as i32 + 1).collect();

    let breakdown = processor()
        .site_breakdown(&sites, &classes)
        .expect("breakdown");

    assert_eq!(breakdown.rows.len(), 500);
    let total: u64 = breakdown
        .rows
        .iter()
        .flat_map(|row| row.classes.iter().map(|&(_, count)| count))
        .sum();
    assert_eq!(total, 50_000);
}
