//! Mean-variance trend of peptide intensities.
//!
//! Log variance is regressed on log mean across peptides; peptides whose
//! Cook's distance exceeds `2 / sqrt(n)` break the trend.

use anyhow::Result;
use tracing::warn;

use crate::math::regression::fit_line;
use crate::math::stats::{mean, variance};
use crate::scores::OutlierRecord;
use crate::table::{Field, HdxTable};

#[derive(Debug, Clone)]
pub struct IntensityPoint {
    pub feature: String,
    pub log_mean: f64,
    pub log_variance: f64,
    pub cooks_distance: f64,
}

#[derive(Debug, Clone)]
pub struct IntensityResult {
    pub threshold: f64,
    pub records: Vec<OutlierRecord>,
    pub points: Vec<IntensityPoint>,
    pub excluded: usize,
}

pub fn intensity_outliers(table: &HdxTable, field: Field) -> Result<IntensityResult> {
    let columns: Vec<usize> = (0..table.n_samples()).collect();

    let mut fitted_rows = Vec::new();
    let mut x = Vec::new();
    let mut y = Vec::new();
    for row in 0..table.n_rows() {
        let values = table.present(row, field, &columns);
        let (Some(m), Some(v)) = (mean(&values), variance(&values)) else {
            continue;
        };
        if m <= 0.0 || v <= 0.0 {
            continue;
        }
        fitted_rows.push(row);
        x.push(m.ln());
        y.push(v.ln());
    }

    let excluded = table.n_rows() - fitted_rows.len();
    if excluded > 0 {
        warn!(
            excluded,
            field = field.label(),
            "peptides without a usable intensity mean/variance excluded from trend fit"
        );
    }

    let n = fitted_rows.len();
    let threshold = if n > 0 { 2.0 / (n as f64).sqrt() } else { 0.0 };
    let mut distance: Vec<Option<f64>> = vec![None; table.n_rows()];
    let mut points = Vec::with_capacity(n);
    if n > 0 {
        let fit = fit_line(&x, &y)?;
        let cooks = fit.cooks_distance(&y);
        for (i, &row) in fitted_rows.iter().enumerate() {
            distance[row] = Some(cooks[i]);
            points.push(IntensityPoint {
                feature: table.row(row).feature.clone(),
                log_mean: x[i],
                log_variance: y[i],
                cooks_distance: cooks[i],
            });
        }
    }

    let records = table
        .rows()
        .iter()
        .zip(distance)
        .map(|(row, d)| OutlierRecord {
            feature: row.feature.clone(),
            statistic: d,
            outlier: d.is_some_and(|d| d > threshold),
        })
        .collect();

    Ok(IntensityResult {
        threshold,
        records,
        points,
        excluded,
    })
}
