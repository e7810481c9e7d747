//! One row per peptide, one column per diagnostic.

use std::collections::HashMap;

use crate::scores::charge::ConditionChargeCorrelation;
use crate::scores::compatible::CompatibleResult;
use crate::scores::drift::{DriftResult, ShiftRecord};
use crate::scores::intensity::IntensityResult;
use crate::scores::mass_error::MassErrorResult;
use crate::scores::missingness::MissingnessResult;
use crate::scores::{ConditionOutliers, OutlierRecord};

pub const MISSING_NOT_AT_RANDOM: &str = "missing_not_at_random";
pub const MASS_ERROR: &str = "mass_error";
pub const INTENSITY_OUTLIER: &str = "intensity_outlier";
pub const RT_LEFT_OUTLIERS: &str = "rt_left_outliers";
pub const RT_RIGHT_OUTLIERS: &str = "rt_right_outliers";
pub const IMS_LEFT_OUTLIERS: &str = "ims_left_outliers";
pub const IMS_RIGHT_OUTLIERS: &str = "ims_right_outliers";
pub const MONOTONICITY_OUTLIER: &str = "monotonicity_outlier";
pub const CHARGE_CORRELATION_OUTLIER: &str = "charge_correlation_outlier";
pub const COMPATIBLE_UPTAKE: &str = "compatible_uptake";
pub const REPLICATE_VARIANCE_OUTLIER: &str = "replicate_variance_outlier";
pub const REPLICATE_SKEW_OUTLIER: &str = "replicate_skew_outlier";
pub const SPECTRAL_OUTLIER: &str = "spectral_outlier";

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub feature: String,
    pub values: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub columns: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    fn new(features: impl IntoIterator<Item = String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: features
                .into_iter()
                .map(|feature| SummaryRow {
                    feature,
                    values: Vec::new(),
                })
                .collect(),
        }
    }

    /// Adds a column holding, per peptide, how many of `hits` name it.
    /// Peptides never named get zero.
    fn push_column<'a>(&mut self, name: &str, hits: impl IntoIterator<Item = &'a str>) {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for feature in hits {
            *counts.entry(feature).or_default() += 1;
        }
        for row in &mut self.rows {
            row.values
                .push(counts.get(row.feature.as_str()).copied().unwrap_or(0));
        }
        self.columns.push(name.to_string());
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row(&self, feature: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.feature == feature)
    }

    pub fn value(&self, feature: &str, column: &str) -> Option<usize> {
        let c = self.column_index(column)?;
        self.row(feature).map(|r| r.values[c])
    }

    /// Peptides with a non-zero entry in `column`.
    pub fn flagged(&self, column: &str) -> Vec<&str> {
        let Some(c) = self.column_index(column) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter(|r| r.values[c] > 0)
            .map(|r| r.feature.as_str())
            .collect()
    }
}

/// Everything the aggregator joins. Spectral scores are optional since they
/// need a peak table.
#[derive(Debug, Clone, Copy)]
pub struct QcResults<'a> {
    pub missingness: &'a MissingnessResult,
    pub mass_error: &'a MassErrorResult,
    pub intensity: &'a IntensityResult,
    pub retention: &'a DriftResult,
    pub mobility: &'a DriftResult,
    pub monotonicity: &'a [ConditionOutliers],
    pub charge: &'a [OutlierRecord],
    pub compatible: &'a CompatibleResult,
    pub replicate_variance: &'a [ConditionOutliers],
    pub replicate_skew: &'a [ConditionOutliers],
    pub spectral: Option<&'a [OutlierRecord]>,
}

fn flagged_records(records: &[OutlierRecord]) -> impl Iterator<Item = &str> {
    records
        .iter()
        .filter(|r| r.outlier)
        .map(|r| r.feature.as_str())
}

fn flagged_shifts(records: &[ShiftRecord]) -> impl Iterator<Item = &str> {
    records
        .iter()
        .filter(|r| r.outlier)
        .map(|r| r.feature.as_str())
}

fn flagged_conditions(conditions: &[ConditionOutliers]) -> impl Iterator<Item = &str> {
    conditions
        .iter()
        .flat_map(|c| c.flagged().map(|r| r.feature.as_str()))
}

/// Rows follow the peptide order of the table the missingness classifier
/// saw, so peptides dropped as missing-not-at-random still get a row.
pub fn quality_control(results: QcResults<'_>) -> SummaryTable {
    let mut summary = SummaryTable::new(
        results
            .missingness
            .records
            .iter()
            .map(|r| r.feature.clone()),
    );

    summary.push_column(
        MISSING_NOT_AT_RANDOM,
        results
            .missingness
            .records
            .iter()
            .filter(|r| r.not_at_random)
            .map(|r| r.feature.as_str()),
    );
    summary.push_column(MASS_ERROR, flagged_records(&results.mass_error.per_peptide));
    summary.push_column(INTENSITY_OUTLIER, flagged_records(&results.intensity.records));
    summary.push_column(RT_LEFT_OUTLIERS, flagged_shifts(&results.retention.left));
    summary.push_column(RT_RIGHT_OUTLIERS, flagged_shifts(&results.retention.right));
    summary.push_column(IMS_LEFT_OUTLIERS, flagged_shifts(&results.mobility.left));
    summary.push_column(IMS_RIGHT_OUTLIERS, flagged_shifts(&results.mobility.right));
    summary.push_column(MONOTONICITY_OUTLIER, flagged_conditions(results.monotonicity));
    summary.push_column(CHARGE_CORRELATION_OUTLIER, flagged_records(results.charge));
    summary.push_column(
        COMPATIBLE_UPTAKE,
        results.compatible.violations.keys().map(String::as_str),
    );
    summary.push_column(
        REPLICATE_VARIANCE_OUTLIER,
        flagged_conditions(results.replicate_variance),
    );
    summary.push_column(
        REPLICATE_SKEW_OUTLIER,
        flagged_conditions(results.replicate_skew),
    );
    if let Some(spectral) = results.spectral {
        summary.push_column(SPECTRAL_OUTLIER, flagged_records(spectral));
    }
    summary
}

/// Sequences with more than one charge state. Every condition scores the
/// same groups.
pub fn charge_groups_scored(results: &[ConditionChargeCorrelation]) -> usize {
    results.first().map_or(0, |c| c.groups.len())
}
