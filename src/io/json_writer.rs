use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::schema::v1::{ConditionThreshold, Diagnostic, HdxQcV1, InputMeta, SpectraSummary};
use crate::scores::ConditionOutliers;
use crate::scores::aggregate::{
    CHARGE_CORRELATION_OUTLIER, INTENSITY_OUTLIER, MASS_ERROR, MISSING_NOT_AT_RANDOM,
    MONOTONICITY_OUTLIER, REPLICATE_SKEW_OUTLIER, REPLICATE_VARIANCE_OUTLIER, SPECTRAL_OUTLIER,
};
use crate::table::HdxTable;

/// Results of diagnostics judged separately per condition.
fn per_condition<'a>(ctx: &'a Ctx, name: &str) -> Option<&'a [ConditionOutliers]> {
    match name {
        MONOTONICITY_OUTLIER => ctx.monotonicity.as_deref(),
        REPLICATE_VARIANCE_OUTLIER => ctx.replicate_variance.as_deref(),
        REPLICATE_SKEW_OUTLIER => ctx.replicate_skew.as_deref(),
        _ => None,
    }
}

pub fn build_report(ctx: &Ctx) -> Result<HdxQcV1> {
    let summary = ctx.summary.as_ref().context("summary table missing")?;
    let table = ctx.table.as_ref().context("filtered table missing")?;
    let normalized = ctx.normalized.as_ref().context("normalized table missing")?;
    let missingness = ctx
        .missingness
        .as_ref()
        .context("missingness result missing")?;

    let threshold_for = |name: &str| -> Option<f64> {
        match name {
            MISSING_NOT_AT_RANDOM => Some(missingness.threshold),
            MASS_ERROR => Some(ctx.config.mass_error_ppm_tolerance),
            INTENSITY_OUTLIER => ctx.intensity.as_ref().map(|i| i.threshold),
            CHARGE_CORRELATION_OUTLIER => Some(ctx.config.charge_correlation_min),
            SPECTRAL_OUTLIER => Some(ctx.config.spectral.similarity_min),
            // Lowest per-condition threshold; replicate thresholds are pooled
            // and therefore equal across conditions.
            _ => per_condition(ctx, name)?
                .iter()
                .filter_map(|c| c.threshold)
                .min_by(|a, b| a.total_cmp(b)),
        }
    };

    let diagnostics = summary
        .columns
        .iter()
        .map(|name| {
            let flagged_features: Vec<String> =
                summary.flagged(name).into_iter().map(String::from).collect();
            let conditions = per_condition(ctx, name)
                .unwrap_or_default()
                .iter()
                .map(|c| ConditionThreshold {
                    condition: c.condition.clone(),
                    threshold: c.threshold.filter(|t| t.is_finite()),
                    min_flagged: c.min_flagged().filter(|t| t.is_finite()),
                    flagged: c.flagged().count() as u64,
                })
                .collect();
            Diagnostic {
                name: name.clone(),
                flagged: flagged_features.len() as u64,
                threshold: threshold_for(name).filter(|t| t.is_finite()),
                flagged_features,
                conditions,
            }
        })
        .collect();

    let spectra = ctx.spectral.as_ref().map(|s| {
        let scores: Vec<f64> = s
            .pairs
            .iter()
            .map(|p| p.score)
            .filter(|v| v.is_finite())
            .collect();
        SpectraSummary {
            scored: s.pairs.len() as u64,
            skipped: s.skipped as u64,
            min_score: scores.iter().copied().min_by(|a, b| a.total_cmp(b)),
            mean_score: crate::math::stats::mean(&scores),
        }
    });

    let mut report = HdxQcV1::empty(&ctx.report.version);
    report.input_meta = input_meta(ctx, &normalized.table, table, normalized.fd_rows.len());
    report.input_meta.removed_missing = Some(missingness.removed as u64);
    report.diagnostics = diagnostics;
    report.spectra = spectra;
    report.summary_tsv_path = ctx.write_tsv.then(|| {
        ctx.output
            .tsv_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    });
    report.warnings = ctx.warnings.clone();
    Ok(report)
}

fn input_meta(ctx: &Ctx, raw: &HdxTable, filtered: &HdxTable, fd_rows: usize) -> InputMeta {
    let sequences: HashSet<&str> = raw.rows().iter().map(|r| r.sequence.as_str()).collect();
    let replicates = raw
        .samples()
        .iter()
        .map(|s| s.replicate + 1)
        .max()
        .unwrap_or(0);
    InputMeta {
        export_rows: Some(ctx.records.len() as u64),
        peptides: Some(filtered.n_rows() as u64),
        sequences: Some(sequences.len() as u64),
        conditions: raw.conditions().to_vec(),
        timepoints: raw.timepoints().to_vec(),
        replicates: Some(replicates as u64),
        fd_rows: Some(fd_rows as u64),
        removed_missing: None,
        imputed_cells: Some(ctx.imputed_cells as u64),
    }
}

pub fn write_json(path: &Path, report: &HdxQcV1) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}
