use std::fs::File;
use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::TempDir;

use kira_hdxqc::config::{ColumnNames, QcConfig};
use kira_hdxqc::input::{RawRecord, parse_export, read_export};
use kira_hdxqc::table::normalize::{normalize, parse_range, parse_timepoint, parse_uptake};
use kira_hdxqc::table::{Field, SampleKey};

const HEADER: &str = "Protein State,Sequence,Start,End,Charge,Deut Time,% Deut,Max Inty,Exp Cent,Theor Cent,Actual RT,Search RT";

fn export_csv(rows: &[String]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for r in rows {
        out.push_str(r);
        out.push('\n');
    }
    out
}

fn row(state: &str, seq: &str, charge: u32, time: &str, uptake: &str) -> String {
    format!("{state},{seq},1,{},{charge},{time},{uptake},1000,500.25,500.2,1.0-2.0,1.5", seq.len())
}

fn records(csv: &str) -> Vec<RawRecord> {
    parse_export(csv.as_bytes(), b',', &ColumnNames::default(), "test").unwrap()
}

fn design_rows() -> Vec<String> {
    let mut rows = Vec::new();
    for state in ["A", "B"] {
        for time in ["0s", "30s"] {
            for charge in [2, 3] {
                for rep in 0..2 {
                    rows.push(row(state, "AAAK", charge, time, &format!("{}", 10 + rep)));
                }
            }
        }
    }
    rows
}

#[test]
fn one_row_per_sequence_and_charge() {
    let recs = records(&export_csv(&design_rows()));
    assert_eq!(recs.len(), 16);
    let normalized = normalize(&recs, None, &QcConfig::default()).unwrap();
    let table = &normalized.table;

    assert_eq!(table.n_rows(), 2);
    assert_eq!(table.n_samples(), 8);
    assert_eq!(table.row(0).feature, "AAAK2");
    assert_eq!(table.row(1).feature, "AAAK3");
    assert_eq!(table.conditions(), ["A".to_string(), "B".to_string()]);
    assert_eq!(table.timepoints(), [0.0, 30.0]);
    assert_eq!(table.row(0).end, Some(4));

    let key = SampleKey {
        condition: 1,
        timepoint: 1,
        replicate: 1,
    };
    assert_eq!(table.value(0, Field::Uptake, key), Some(11.0));
    assert_eq!(table.value(0, Field::LeftRt, key), Some(1.0));
    assert_eq!(table.value(0, Field::RightRt, key), Some(2.0));
    let column = table.column(key).unwrap();
    assert_eq!(table.sample_label(column), "B_30_2");
}

#[test]
fn states_are_renamed_in_order() {
    let recs = records(&export_csv(&design_rows()));
    let names = vec!["apo".to_string(), "holo".to_string()];
    let normalized = normalize(&recs, Some(&names), &QcConfig::default()).unwrap();
    assert_eq!(normalized.table.conditions(), names.as_slice());
    assert_eq!(normalized.label_for("B"), Some("holo"));
}

#[test]
fn state_count_mismatch_fails() {
    let recs = records(&export_csv(&design_rows()));
    let names = vec!["x".to_string(), "y".to_string(), "z".to_string()];
    let err = normalize(&recs, Some(&names), &QcConfig::default()).unwrap_err();
    assert!(err.to_string().contains("distinct states"));
}

#[test]
fn fully_deuterated_rows_are_segregated() {
    let mut rows = design_rows();
    rows.push(row("A", "AAAK", 2, "FD", "95"));
    let recs = records(&export_csv(&rows));
    let normalized = normalize(&recs, None, &QcConfig::default()).unwrap();
    assert_eq!(normalized.fd_rows.len(), 1);
    assert_eq!(normalized.fd_rows[0].uptake, Some(95.0));
    assert_eq!(normalized.table.timepoints(), [0.0, 30.0]);
}

#[test]
fn blank_uptake_is_zero_and_na_is_missing() {
    let rows = vec![
        row("A", "AAAK", 2, "0s", ""),
        row("A", "AAAK", 2, "1m", "n/a"),
    ];
    let recs = records(&export_csv(&rows));
    let normalized = normalize(&recs, None, &QcConfig::default()).unwrap();
    let table = &normalized.table;
    assert_eq!(table.timepoints(), [0.0, 60.0]);
    assert_eq!(table.row_values(0, Field::Uptake), [Some(0.0), None]);
}

#[test]
fn empty_export_is_rejected() {
    let recs: Vec<RawRecord> = Vec::new();
    assert!(normalize(&recs, None, &QcConfig::default()).is_err());
}

#[test]
fn missing_required_column_is_reported() {
    let csv = "Sequence,Charge,Deut Time\nAAAK,2,0\n";
    let err = parse_export(csv.as_bytes(), b',', &ColumnNames::default(), "test").unwrap_err();
    assert!(err.to_string().contains("missing required column"));
}

#[test]
fn header_aliases_match_loosely() {
    let csv = "Protein.State,Sequence,Charge,Deut.Time,X..Deut\nA,AAAK,2,0,5\n";
    let recs = records(csv);
    assert_eq!(recs[0].state, "A");
    assert_eq!(recs[0].uptake.as_deref(), Some("5"));
}

#[test]
fn gzip_export_is_read_transparently() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("export.csv.gz");
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    encoder
        .write_all(export_csv(&design_rows()).as_bytes())
        .unwrap();
    encoder.finish().unwrap();

    let recs = read_export(&path, &ColumnNames::default()).unwrap();
    assert_eq!(recs.len(), 16);
}

#[test]
fn timepoint_units() {
    assert_eq!(parse_timepoint("30").unwrap(), 30.0);
    assert_eq!(parse_timepoint("30s").unwrap(), 30.0);
    assert_eq!(parse_timepoint("10 min").unwrap(), 600.0);
    assert_eq!(parse_timepoint("2h").unwrap(), 7200.0);
    assert!(parse_timepoint("soon").is_err());
    assert!(parse_timepoint("5 days").is_err());
}

#[test]
fn ranges_and_uptake_cells() {
    assert_eq!(
        parse_range(Some("1.5-2.25"), "n/a").unwrap(),
        (Some(1.5), Some(2.25))
    );
    assert_eq!(parse_range(Some("n/a"), "n/a").unwrap(), (None, None));
    assert!(parse_range(Some("12"), "n/a").is_err());
    assert_eq!(parse_uptake(Some(""), "n/a").unwrap(), Some(0.0));
    assert_eq!(parse_uptake(None, "n/a").unwrap(), None);
}

#[test]
fn non_finite_cells_are_rejected() {
    for bad in ["NaN", "inf", "-infinity"] {
        let rows = vec![
            row("A", "AAK", 2, "1m", "1"),
            row("A", "AAK", 2, "2m", bad),
        ];
        let recs = records(&export_csv(&rows));
        let err = normalize(&recs, None, &QcConfig::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("not a finite number"), "{}", bad);
    }
    assert!(parse_range(Some("1.0-inf"), "n/a").is_err());
}

#[test]
fn range_bounds_in_scientific_notation() {
    assert_eq!(
        parse_range(Some("1e-1-2"), "n/a").unwrap(),
        (Some(0.1), Some(2.0))
    );
    assert_eq!(
        parse_range(Some("2.5E-1-3.5e-1"), "n/a").unwrap(),
        (Some(0.25), Some(0.35))
    );
    assert_eq!(parse_range(Some("-1-2"), "n/a").unwrap(), (Some(-1.0), Some(2.0)));
}
