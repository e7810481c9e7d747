use kira_hdxqc::math::regression::fit_line;
use kira_hdxqc::scores::intensity::intensity_outliers;
use kira_hdxqc::table::{Field, HdxTable, PeptideRow};

fn intensity_table(samples: &[[f64; 3]]) -> HdxTable {
    let mut table = HdxTable::new(
        vec!["apo".to_string()],
        vec![30.0],
        &[(0, 0), (0, 1), (0, 2)],
    )
    .unwrap();
    for (i, values) in samples.iter().enumerate() {
        let seq = format!("PEPTIDE{}", "A".repeat(i + 1));
        let row = table.push_row(PeptideRow::new(&seq, 2, None, None)).unwrap();
        for (c, v) in values.iter().enumerate() {
            table.set(row, Field::MaxIntensity, c, Some(*v));
        }
    }
    table
}

#[test]
fn fit_line_recovers_exact_line() {
    let fit = fit_line(&[0.0, 1.0, 2.0, 3.0], &[1.0, 3.0, 5.0, 7.0]).unwrap();
    assert!((fit.slope - 2.0).abs() < 1e-12);
    assert!((fit.intercept - 1.0).abs() < 1e-12);
    let cooks = fit.cooks_distance(&[1.0, 3.0, 5.0, 7.0]);
    assert!(cooks.iter().all(|d| *d == 0.0));
}

#[test]
fn fit_line_constant_predictor_is_intercept_only() {
    let fit = fit_line(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).unwrap();
    assert_eq!(fit.slope, 0.0);
    assert!((fit.intercept - 2.0).abs() < 1e-12);
}

#[test]
fn fit_line_rejects_bad_input() {
    assert!(fit_line(&[], &[]).is_err());
    assert!(fit_line(&[1.0, 2.0], &[1.0]).is_err());
    assert!(fit_line(&[1.0, f64::NAN], &[1.0, 2.0]).is_err());
}

#[test]
fn off_trend_variance_is_flagged() {
    let samples: Vec<[f64; 3]> = (1..=12)
        .map(|i| {
            let m = 2f64.powi(i);
            let d = if i == 12 { 10.0 * m / 16.0 } else { m / 16.0 };
            [m - d, m, m + d]
        })
        .collect();
    let table = intensity_table(&samples);
    let result = intensity_outliers(&table, Field::MaxIntensity).unwrap();

    assert!((result.threshold - 2.0 / 12f64.sqrt()).abs() < 1e-12);
    assert_eq!(result.excluded, 0);
    let flagged: Vec<usize> = result
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.outlier)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(flagged, vec![11]);
    assert!(result.records[11].statistic.unwrap() > 2.0);
}

#[test]
fn identical_variances_flag_nothing() {
    let samples: Vec<[f64; 3]> = (1..=6)
        .map(|i| {
            let m = 100.0 * i as f64;
            [m - 5.0, m, m + 5.0]
        })
        .collect();
    let table = intensity_table(&samples);
    let result = intensity_outliers(&table, Field::MaxIntensity).unwrap();
    assert!(result.records.iter().all(|r| !r.outlier));
}

#[test]
fn peptides_without_spread_are_excluded() {
    let table = intensity_table(&[[10.0, 10.0, 10.0], [5.0, 10.0, 15.0], [1.0, 2.0, 3.0]]);
    let result = intensity_outliers(&table, Field::MaxIntensity).unwrap();
    assert_eq!(result.excluded, 1);
    assert_eq!(result.records[0].statistic, None);
    assert!(!result.records[0].outlier);
    assert_eq!(result.points.len(), 2);
}
