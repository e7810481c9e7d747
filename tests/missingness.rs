use kira_hdxqc::config::ImputeScope;
use kira_hdxqc::scores::missingness::{classify_missing, impute_zero};
use kira_hdxqc::table::{Field, HdxTable, PeptideRow};

// One condition, timepoints 0 and 60, two replicates each.
fn table(rows: &[(&str, Vec<Option<f64>>)]) -> HdxTable {
    let mut t = HdxTable::new(
        vec!["apo".to_string()],
        vec![0.0, 60.0],
        &[(0, 0), (0, 1), (1, 0), (1, 1)],
    )
    .unwrap();
    for (seq, values) in rows {
        let r = t.push_row(PeptideRow::new(seq, 2, None, None)).unwrap();
        for (c, v) in values.iter().enumerate() {
            t.set(r, Field::Uptake, c, *v);
        }
    }
    t
}

#[test]
fn default_threshold_is_half_the_columns_and_strict() {
    let t = table(&[
        ("AAAK", vec![None, None, Some(1.0), Some(1.0)]),
        ("CCCK", vec![None, None, None, Some(1.0)]),
    ]);
    let (filtered, result) = classify_missing(&t, None, true).unwrap();
    assert_eq!(result.threshold, 2.0);
    assert_eq!(result.records[0].missing, 2);
    assert!(!result.records[0].not_at_random);
    assert!(result.records[1].not_at_random);
    assert_eq!(result.removed, 1);
    assert_eq!(filtered.n_rows(), 1);
    assert_eq!(filtered.row(0).feature, "AAAK2");
}

#[test]
fn without_filter_rows_stay_flagged() {
    let t = table(&[
        ("AAAK", vec![Some(1.0); 4]),
        ("CCCK", vec![None; 4]),
    ]);
    let (kept, result) = classify_missing(&t, Some(3.0), false).unwrap();
    assert_eq!(result.removed, 0);
    assert_eq!(result.flagged(), 1);
    assert_eq!(kept.n_rows(), 2);
    assert!(kept.row(1).not_missing_at_random);
    assert!(!kept.row(0).not_missing_at_random);
}

#[test]
fn zero_imputation_scopes() {
    let t = table(&[("AAAK", vec![None, Some(1.0), None, None])]);

    let (only_zero, n) = impute_zero(&t, ImputeScope::ZeroTimepoint);
    assert_eq!(n, 1);
    assert_eq!(
        only_zero.row_values(0, Field::Uptake),
        [Some(0.0), Some(1.0), None, None]
    );

    let (all, n) = impute_zero(&t, ImputeScope::All);
    assert_eq!(n, 3);
    assert!(all.row_values(0, Field::Uptake).iter().all(|v| v.is_some()));
    // Input untouched.
    assert_eq!(t.row_values(0, Field::Uptake)[0], None);
}

#[test]
fn threshold_at_column_count_removes_nothing() {
    let t = table(&[
        ("AAAK", vec![None; 4]),
        ("CCCK", vec![None, None, None, Some(1.0)]),
    ]);
    let (filtered, result) = classify_missing(&t, Some(t.n_samples() as f64), true).unwrap();
    assert_eq!(result.removed, 0);
    assert_eq!(result.flagged(), 0);
    assert_eq!(filtered.n_rows(), 2);
}

#[test]
fn filtered_rows_stay_within_threshold() {
    let t = table(&[
        ("AAAK", vec![Some(1.0); 4]),
        ("CCCK", vec![None, Some(1.0), Some(1.0), Some(1.0)]),
        ("DDDK", vec![None, None, Some(1.0), Some(1.0)]),
        ("EEEK", vec![None, None, None, Some(1.0)]),
        ("FFFK", vec![None; 4]),
    ]);
    for threshold in [None, Some(0.0), Some(1.0), Some(2.5), Some(3.0)] {
        let (filtered, result) = classify_missing(&t, threshold, true).unwrap();
        assert_eq!(filtered.n_rows() + result.removed, t.n_rows());
        for row in 0..filtered.n_rows() {
            let missing = filtered
                .row_values(row, Field::Uptake)
                .iter()
                .filter(|v| v.is_none())
                .count();
            assert!(missing as f64 <= result.threshold);
        }
    }
}
