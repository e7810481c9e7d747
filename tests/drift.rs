use kira_hdxqc::config::DriftFields;
use kira_hdxqc::scores::drift::{drift_outliers, iqr_flags};
use kira_hdxqc::table::{Field, HdxTable, PeptideRow};

#[test]
fn iqr_flag_boundary_is_strict() {
    let at_limit = iqr_flags(&[-1.0, 0.0, 0.0, 1.0, 1.5], 1.5);
    assert!(at_limit.iter().all(|f| !f));

    let beyond = iqr_flags(&[-1.0, 0.0, 0.0, 1.0, 1.5000001], 1.5);
    assert_eq!(beyond, vec![false, false, false, false, true]);
}

#[test]
fn iqr_flags_empty_input() {
    assert!(iqr_flags(&[], 1.5).is_empty());
}

#[test]
fn shifted_retention_window_is_flagged() {
    let slots: Vec<(usize, usize)> = (0..5).map(|r| (0, r)).collect();
    let mut t = HdxTable::new(vec!["apo".to_string()], vec![30.0], &slots).unwrap();
    let r = t.push_row(PeptideRow::new("AAAK", 2, None, None)).unwrap();
    for (c, v) in [10.0, 10.0, 10.0, 10.0, 20.0].into_iter().enumerate() {
        t.set(r, Field::LeftRt, c, Some(v));
        t.set(r, Field::SearchRt, c, Some(12.0));
    }

    let result = drift_outliers(&t, DriftFields::retention(), 1.5);
    assert_eq!(result.left.len(), 5);
    assert!(result.right.is_empty());
    assert_eq!(result.flagged(), 1);

    let flagged = &result.left[4];
    assert!(flagged.outlier);
    assert_eq!(flagged.shift, 10.0);
    assert_eq!(flagged.sample, "apo_30_5");
    assert_eq!(flagged.search, Some(12.0));
    assert_eq!(flagged.feature, "AAAK2");
}
