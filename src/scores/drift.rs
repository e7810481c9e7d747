//! Retention-time and ion-mobility window drift.
//!
//! Each window bound is centred on its peptide's median across samples;
//! shifts are then judged against the interquartile range of all shifts of
//! the same condition.

use crate::config::DriftFields;
use crate::math::stats::{iqr, median};
use crate::table::{Field, HdxTable};

#[derive(Debug, Clone)]
pub struct ShiftRecord {
    pub feature: String,
    pub sequence: String,
    pub condition: String,
    pub sample: String,
    pub search: Option<f64>,
    pub shift: f64,
    pub outlier: bool,
}

#[derive(Debug, Clone)]
pub struct DriftResult {
    pub left: Vec<ShiftRecord>,
    pub right: Vec<ShiftRecord>,
}

impl DriftResult {
    pub fn flagged(&self) -> usize {
        self.left.iter().chain(&self.right).filter(|r| r.outlier).count()
    }
}

/// `|shift| > multiplier * iqr` for every shift, with the IQR taken over the
/// whole slice.
pub fn iqr_flags(shifts: &[f64], multiplier: f64) -> Vec<bool> {
    let mut scratch = shifts.to_vec();
    let Some(spread) = iqr(&mut scratch) else {
        return vec![false; shifts.len()];
    };
    let limit = multiplier * spread;
    shifts.iter().map(|s| s.abs() > limit).collect()
}

pub fn drift_outliers(table: &HdxTable, fields: DriftFields, multiplier: f64) -> DriftResult {
    DriftResult {
        left: side_outliers(table, fields.left, fields.search, multiplier),
        right: side_outliers(table, fields.right, fields.search, multiplier),
    }
}

fn side_outliers(
    table: &HdxTable,
    field: Field,
    search: Field,
    multiplier: f64,
) -> Vec<ShiftRecord> {
    let mut records = Vec::new();
    let mut by_condition: Vec<Vec<usize>> = vec![Vec::new(); table.conditions().len()];

    for (row, peptide) in table.rows().iter().enumerate() {
        let values = table.row_values(row, field);
        let mut present: Vec<f64> = values.iter().flatten().copied().collect();
        let Some(center) = median(&mut present) else {
            continue;
        };
        for (column, value) in values.iter().enumerate() {
            let Some(value) = value else {
                continue;
            };
            let condition = table.samples()[column].condition;
            by_condition[condition].push(records.len());
            records.push(ShiftRecord {
                feature: peptide.feature.clone(),
                sequence: peptide.sequence.clone(),
                condition: table.conditions()[condition].clone(),
                sample: table.sample_label(column),
                search: table.get(row, search, column),
                shift: value - center,
                outlier: false,
            });
        }
    }

    for members in by_condition {
        let shifts: Vec<f64> = members.iter().map(|&i| records[i].shift).collect();
        for (&i, flag) in members.iter().zip(iqr_flags(&shifts, multiplier)) {
            records[i].outlier = flag;
        }
    }

    records
}
