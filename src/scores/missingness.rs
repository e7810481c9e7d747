use anyhow::Result;
use tracing::info;

use crate::config::ImputeScope;
use crate::table::{Field, HdxTable};

#[derive(Debug, Clone)]
pub struct MissingRecord {
    pub feature: String,
    pub missing: usize,
    pub not_at_random: bool,
}

#[derive(Debug, Clone)]
pub struct MissingnessResult {
    pub threshold: f64,
    pub records: Vec<MissingRecord>,
    pub removed: usize,
}

impl MissingnessResult {
    pub fn flagged(&self) -> usize {
        self.records.iter().filter(|r| r.not_at_random).count()
    }
}

/// Flags peptides whose missing uptake count exceeds `threshold` (default
/// half the column count). With `filter` the flagged peptides are dropped
/// from the returned table; otherwise they stay with the flag set in the
/// row metadata.
pub fn classify_missing(
    table: &HdxTable,
    threshold: Option<f64>,
    filter: bool,
) -> Result<(HdxTable, MissingnessResult)> {
    let threshold = threshold.unwrap_or(table.n_samples() as f64 / 2.0);

    let mut records = Vec::with_capacity(table.n_rows());
    for (i, row) in table.rows().iter().enumerate() {
        let missing = table
            .row_values(i, Field::Uptake)
            .iter()
            .filter(|v| v.is_none())
            .count();
        records.push(MissingRecord {
            feature: row.feature.clone(),
            missing,
            not_at_random: missing as f64 > threshold,
        });
    }

    let mut flagged = table.clone();
    for (i, r) in records.iter().enumerate() {
        flagged.set_not_missing_at_random(i, r.not_at_random);
    }

    let (out, removed) = if filter {
        let keep: Vec<bool> = records.iter().map(|r| !r.not_at_random).collect();
        let removed = keep.iter().filter(|k| !**k).count();
        (flagged.retain_rows(&keep)?, removed)
    } else {
        (flagged, 0)
    };

    info!(
        threshold,
        flagged = records.iter().filter(|r| r.not_at_random).count(),
        removed,
        "missingness_classified"
    );

    Ok((
        out,
        MissingnessResult {
            threshold,
            records,
            removed,
        },
    ))
}

/// Replaces missing uptake cells with zero in a copy of the table. Returns
/// the copy and the number of imputed cells.
pub fn impute_zero(table: &HdxTable, scope: ImputeScope) -> (HdxTable, usize) {
    let mut out = table.clone();
    let mut imputed = 0usize;
    for row in 0..table.n_rows() {
        for column in 0..table.n_samples() {
            if table.get(row, Field::Uptake, column).is_some() {
                continue;
            }
            let eligible = match scope {
                ImputeScope::All => true,
                ImputeScope::ZeroTimepoint => table.sample_timepoint(column) == 0.0,
            };
            if eligible {
                out.set(row, Field::Uptake, column, Some(0.0));
                imputed += 1;
            }
        }
    }
    info!(imputed, "zero_imputation_done");
    (out, imputed)
}
