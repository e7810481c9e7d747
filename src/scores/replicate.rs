//! Replicate consistency within timepoint groups.
//!
//! Two views: dispersion (largest within-timepoint variance) and skew
//! (largest mean/median divergence). Both are flagged against a quantile
//! of the statistic pooled over every condition.

use anyhow::Result;

use crate::math::stats::{mean, median, quantile, variance};
use crate::scores::{ConditionOutliers, OutlierRecord};
use crate::table::{Design, Field, HdxTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicateStatistic {
    Variance,
    MeanMedianGap,
}

impl ReplicateStatistic {
    fn group_value(self, values: &[f64]) -> Option<f64> {
        match self {
            ReplicateStatistic::Variance => variance(values),
            ReplicateStatistic::MeanMedianGap => {
                let m = mean(values)?;
                let mut scratch = values.to_vec();
                let med = median(&mut scratch)?;
                Some((m - med).abs())
            }
        }
    }
}

pub fn replicate_correlation(
    table: &HdxTable,
    design: &Design,
    quantile_level: f64,
) -> Result<Vec<ConditionOutliers>> {
    replicate_statistic(table, design, ReplicateStatistic::Variance, quantile_level)
}

pub fn replicate_outlier(
    table: &HdxTable,
    design: &Design,
    quantile_level: f64,
) -> Result<Vec<ConditionOutliers>> {
    replicate_statistic(
        table,
        design,
        ReplicateStatistic::MeanMedianGap,
        quantile_level,
    )
}

pub fn replicate_statistic(
    table: &HdxTable,
    design: &Design,
    kind: ReplicateStatistic,
    quantile_level: f64,
) -> Result<Vec<ConditionOutliers>> {
    let conditions = design.resolve(table)?;
    let groups = design.timepoint_groups();

    let mut per_condition: Vec<(String, Vec<f64>)> = Vec::with_capacity(conditions.len());
    for cond in &conditions {
        let stats = (0..table.n_rows())
            .map(|row| {
                groups
                    .iter()
                    .filter_map(|(_, positions)| {
                        let columns: Vec<usize> =
                            positions.iter().map(|&p| cond.columns[p]).collect();
                        kind.group_value(&table.present(row, Field::Uptake, &columns))
                    })
                    .fold(0.0f64, f64::max)
            })
            .collect();
        per_condition.push((cond.label.clone(), stats));
    }

    let mut pooled: Vec<f64> = per_condition
        .iter()
        .flat_map(|(_, s)| s.iter().copied())
        .collect();
    let threshold = quantile(&mut pooled, quantile_level);

    Ok(per_condition
        .into_iter()
        .map(|(condition, stats)| ConditionOutliers {
            condition,
            threshold,
            records: table
                .rows()
                .iter()
                .zip(stats)
                .map(|(row, s)| OutlierRecord {
                    feature: row.feature.clone(),
                    statistic: Some(s),
                    outlier: threshold.is_some_and(|t| s > t),
                })
                .collect(),
        })
        .collect())
}
