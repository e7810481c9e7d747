use kira_hdxqc::scores::charge::{charge_correlation, charge_groups, charge_outliers};
use kira_hdxqc::table::{Design, Field, HdxTable, PeptideRow};

fn table() -> HdxTable {
    let slots: Vec<(usize, usize)> = (0..4).map(|t| (t, 0)).collect();
    let mut t =
        HdxTable::new(vec!["apo".to_string()], vec![0.0, 10.0, 60.0, 600.0], &slots).unwrap();
    let rows = [
        ("AAAK", 2, [0.0, 1.0, 2.0, 3.0]),
        ("AAAK", 3, [0.0, 2.0, 4.0, 6.0]),
        ("CCCK", 1, [0.0, 1.0, 2.0, 3.0]),
        ("CCCK", 2, [0.0, 1.0, 2.0, 3.5]),
        // Timepoint zero is excluded, so this one runs backwards.
        ("CCCK", 3, [9.0, 3.0, 2.0, 1.0]),
        ("DDDK", 2, [0.0, 1.0, 1.0, 1.0]),
    ];
    for (seq, z, values) in rows {
        let r = t.push_row(PeptideRow::new(seq, z, None, None)).unwrap();
        for (c, v) in values.into_iter().enumerate() {
            t.set(r, Field::Uptake, c, Some(v));
        }
    }
    t
}

#[test]
fn groups_are_multi_charge_sequences_in_order() {
    let t = table();
    let groups = charge_groups(&t);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0], ("AAAK".to_string(), vec![0, 1]));
    assert_eq!(groups[1], ("CCCK".to_string(), vec![2, 3, 4]));
}

#[test]
fn matrices_are_padded_to_the_widest_group() {
    let t = table();
    let design = Design::from_table(&t);
    let result = charge_correlation(&t, &design).unwrap();
    let aaak = &result[0].groups[0];
    assert_eq!(aaak.charges, vec![Some(2), Some(3), None]);
    assert_eq!(aaak.matrix.len(), 3);
    assert!((aaak.matrix[0][1].unwrap() - 1.0).abs() < 1e-12);
    assert_eq!(aaak.matrix[0][2], None);
    assert_eq!(aaak.matrix[2][2], None);

    let ccck = &result[0].groups[1];
    assert!((ccck.matrix[0][2].unwrap() + 1.0).abs() < 1e-12);
}

#[test]
fn poorly_correlated_charge_states_are_flagged() {
    let t = table();
    let design = Design::from_table(&t);
    let result = charge_correlation(&t, &design).unwrap();
    let records = charge_outliers(&t, &result, 0.8);

    let flagged: Vec<&str> = records
        .iter()
        .filter(|r| r.outlier)
        .map(|r| r.feature.as_str())
        .collect();
    assert_eq!(flagged, vec!["CCCK1", "CCCK2", "CCCK3"]);
    assert!(!records[0].outlier);
    assert_eq!(records[5].feature, "DDDK2");
    assert_eq!(records[5].statistic, None);
}
