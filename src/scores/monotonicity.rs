//! Monotonicity of deuterium uptake over exchange time.
//!
//! The statistic is the footrule distance between the descending ranking of
//! replicate-mean uptake and the descending ranking of timepoints. Uptake
//! that only rises or plateaus scores zero.

use anyhow::Result;

use crate::math::stats::{descending_ranks, mean};
use crate::scores::{ConditionOutliers, OutlierRecord};
use crate::table::{Design, Field, HdxTable};

/// Footrule distance for replicate means ordered by ascending timepoint.
pub fn monotonicity_statistic(means: &[f64], timepoints: &[f64]) -> f64 {
    let by_uptake = descending_ranks(means);
    let by_time = descending_ranks(timepoints);
    by_uptake
        .iter()
        .zip(&by_time)
        .map(|(a, b)| (*a as f64 - *b as f64).abs())
        .sum()
}

/// Smallest statistic value whose cumulative frequency exceeds `quantile`.
pub fn empirical_threshold(stats: &[f64], quantile: f64) -> Option<f64> {
    if stats.is_empty() {
        return None;
    }
    let mut sorted = stats.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len() as f64;
    let mut i = 0;
    while i < sorted.len() {
        let value = sorted[i];
        while i < sorted.len() && sorted[i] == value {
            i += 1;
        }
        if i as f64 / n > quantile {
            return Some(value);
        }
    }
    None
}

pub fn compute_monotonicity(
    table: &HdxTable,
    design: &Design,
    quantile: f64,
) -> Result<Vec<ConditionOutliers>> {
    let conditions = design.resolve(table)?;
    let groups = design.timepoint_groups();

    let mut out = Vec::with_capacity(conditions.len());
    for cond in conditions {
        let mut stats = Vec::with_capacity(table.n_rows());
        for row in 0..table.n_rows() {
            let mut means = Vec::with_capacity(groups.len());
            let mut times = Vec::with_capacity(groups.len());
            for (t, positions) in &groups {
                let columns: Vec<usize> = positions.iter().map(|&p| cond.columns[p]).collect();
                if let Some(m) = mean(&table.present(row, Field::Uptake, &columns)) {
                    means.push(m);
                    times.push(*t);
                }
            }
            stats.push(monotonicity_statistic(&means, &times));
        }

        let threshold = empirical_threshold(&stats, quantile);
        let records = table
            .rows()
            .iter()
            .zip(&stats)
            .map(|(row, &s)| OutlierRecord {
                feature: row.feature.clone(),
                statistic: Some(s),
                outlier: threshold.is_some_and(|t| s >= t && s > 0.0),
            })
            .collect();

        out.push(ConditionOutliers {
            condition: cond.label,
            threshold,
            records,
        });
    }
    Ok(out)
}
