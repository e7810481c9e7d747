use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use kira_hdxqc::config::QcConfig;
use kira_hdxqc::ctx::Ctx;
use kira_hdxqc::io::json_writer::build_report;
use kira_hdxqc::pipeline::full_run;
use kira_hdxqc::scores::aggregate::{
    MASS_ERROR, MISSING_NOT_AT_RANDOM, MONOTONICITY_OUTLIER, REPLICATE_VARIANCE_OUTLIER,
};

const HEADER: &str = "Protein State,Sequence,Start,End,Charge,Deut Time,% Deut,Max Inty,Exp Cent,Theor Cent,Actual RT,Search RT";

// Two conditions, three timepoints, three identical replicates, two
// well-behaved peptides.
fn clean_export(dir: &Path, extra: &[&str]) -> PathBuf {
    let mut out = String::from(HEADER);
    out.push('\n');
    for state in ["A", "B"] {
        for (t, time) in ["0", "30", "300"].into_iter().enumerate() {
            for (seq, z, start, end) in [("AAAAK", 2, 1, 5), ("CCCCCK", 3, 10, 15)] {
                for rep in 0..3 {
                    out.push_str(&format!(
                        "{state},{seq},{start},{end},{z},{time},{},{},500.001,500.0,1.0-2.0,1.5\n",
                        t * 10,
                        1000 + 100 * rep
                    ));
                }
            }
        }
    }
    for line in extra {
        out.push_str(line);
        out.push('\n');
    }
    let path = dir.join("export.csv");
    fs::write(&path, out).unwrap();
    path
}

fn ctx(input: PathBuf, out: PathBuf) -> Ctx {
    let mut ctx = Ctx::new(input, out, QcConfig::default(), "0.0.0-test");
    ctx.write_json = true;
    ctx.write_tsv = true;
    ctx.write_plots = true;
    ctx
}

#[test]
fn clean_data_flags_nothing() {
    let tmp = TempDir::new().unwrap();
    let input = clean_export(tmp.path(), &[]);
    let mut ctx = ctx(input, tmp.path().join("out"));
    full_run().run(&mut ctx).unwrap();

    let summary = ctx.summary.as_ref().unwrap();
    assert_eq!(summary.rows.len(), 2);
    assert_eq!(summary.columns.len(), 12);
    assert_eq!(summary.rows[0].feature, "AAAAK2");
    assert!(summary.rows.iter().all(|r| r.values.iter().all(|v| *v == 0)));

    assert!(ctx.output.tsv_path.exists());
    assert!(ctx.output.json_path.exists());
    assert!(ctx.output.plots_dir.join("mass_error.tsv").exists());
    assert!(ctx.output.plots_dir.join("monotonicity.tsv").exists());
    assert!(!ctx.output.plots_dir.join("spectral.tsv").exists());
}

#[test]
fn missing_peptide_is_reported_after_filtering() {
    let tmp = TempDir::new().unwrap();
    // Seen once out of eighteen sample slots.
    let input = clean_export(
        tmp.path(),
        &["A,DDDDDK,30,35,2,30,5,900,500.001,500.0,1.0-2.0,1.5"],
    );
    let mut ctx = ctx(input, tmp.path().join("out"));
    full_run().run(&mut ctx).unwrap();

    assert_eq!(ctx.table.as_ref().unwrap().n_rows(), 2);
    let summary = ctx.summary.as_ref().unwrap();
    assert_eq!(summary.rows.len(), 3);
    assert_eq!(summary.value("DDDDDK2", MISSING_NOT_AT_RANDOM), Some(1));
    assert_eq!(summary.value("DDDDDK2", REPLICATE_VARIANCE_OUTLIER), Some(0));
    assert_eq!(summary.flagged(MISSING_NOT_AT_RANDOM), vec!["DDDDDK2"]);

    let report = build_report(&ctx).unwrap();
    assert_eq!(report.input_meta.removed_missing, Some(1));
    assert_eq!(report.input_meta.peptides, Some(2));
    assert_eq!(report.input_meta.replicates, Some(3));
    assert!(!report.warnings.is_empty());
}

#[test]
fn summary_tsv_header_is_fixed() {
    let tmp = TempDir::new().unwrap();
    let input = clean_export(tmp.path(), &[]);
    let mut ctx = ctx(input, tmp.path().join("out"));
    full_run().run(&mut ctx).unwrap();

    let text = fs::read_to_string(&ctx.output.tsv_path).unwrap();
    let header = text.lines().next().unwrap();
    assert_eq!(
        header,
        "feature\tmissing_not_at_random\tmass_error\tintensity_outlier\trt_left_outliers\trt_right_outliers\tims_left_outliers\tims_right_outliers\tmonotonicity_outlier\tcharge_correlation_outlier\tcompatible_uptake\treplicate_variance_outlier\treplicate_skew_outlier"
    );
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn unknown_state_names_fail_the_run() {
    let tmp = TempDir::new().unwrap();
    let input = clean_export(tmp.path(), &[]);
    let mut ctx = ctx(input, tmp.path().join("out"));
    ctx.states = Some(vec!["only_one".to_string()]);
    assert!(full_run().run(&mut ctx).is_err());
}

#[test]
fn report_carries_per_condition_thresholds() {
    let tmp = TempDir::new().unwrap();
    let input = clean_export(tmp.path(), &[]);
    let mut ctx = ctx(input, tmp.path().join("out"));
    full_run().run(&mut ctx).unwrap();

    let report = build_report(&ctx).unwrap();
    let diagnostic = |name: &str| {
        report
            .diagnostics
            .iter()
            .find(|d| d.name == name)
            .unwrap()
            .clone()
    };

    // Every peptide is monotone, so each condition's threshold is zero and
    // nothing is flagged.
    let mono = diagnostic(MONOTONICITY_OUTLIER);
    assert_eq!(mono.threshold, Some(0.0));
    let names: Vec<&str> = mono.conditions.iter().map(|c| c.condition.as_str()).collect();
    assert_eq!(names, ["A", "B"]);
    assert!(mono.conditions.iter().all(|c| c.threshold == Some(0.0)));
    assert!(mono.conditions.iter().all(|c| c.min_flagged.is_none() && c.flagged == 0));

    assert_eq!(diagnostic(REPLICATE_VARIANCE_OUTLIER).conditions.len(), 2);
    assert!(diagnostic(MASS_ERROR).conditions.is_empty());
}
