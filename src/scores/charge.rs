use std::collections::HashMap;

use anyhow::Result;

use crate::math::stats::pearson;
use crate::scores::OutlierRecord;
use crate::table::{Design, Field, HdxTable};

/// Correlation of uptake between the charge states of one sequence.
/// `charges` and `matrix` are padded to the largest charge count in the
/// condition; padded slots are `None`.
#[derive(Debug, Clone)]
pub struct ChargeCorrelation {
    pub sequence: String,
    pub charges: Vec<Option<u32>>,
    pub matrix: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone)]
pub struct ConditionChargeCorrelation {
    pub condition: String,
    pub groups: Vec<ChargeCorrelation>,
}

/// Sequences observed at more than one charge, as row indices sorted by
/// charge, in order of first appearance.
pub fn charge_groups(table: &HdxTable) -> Vec<(String, Vec<usize>)> {
    let mut order: Vec<String> = Vec::new();
    let mut members: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, row) in table.rows().iter().enumerate() {
        let entry = members.entry(row.sequence.as_str()).or_default();
        if entry.is_empty() {
            order.push(row.sequence.clone());
        }
        entry.push(i);
    }
    order
        .into_iter()
        .filter_map(|seq| {
            let mut rows = members.remove(seq.as_str())?;
            if rows.len() < 2 {
                return None;
            }
            rows.sort_by_key(|&r| table.row(r).charge);
            Some((seq, rows))
        })
        .collect()
}

pub fn charge_correlation(
    table: &HdxTable,
    design: &Design,
) -> Result<Vec<ConditionChargeCorrelation>> {
    let conditions = design.resolve(table)?;
    let groups = charge_groups(table);
    let width = groups.iter().map(|(_, rows)| rows.len()).max().unwrap_or(0);

    let mut out = Vec::with_capacity(conditions.len());
    for cond in conditions {
        let columns: Vec<usize> = cond
            .columns
            .iter()
            .zip(&design.timepoints)
            .filter(|(_, t)| **t != 0.0)
            .map(|(c, _)| *c)
            .collect();

        let mut correlations = Vec::with_capacity(groups.len());
        for (sequence, rows) in &groups {
            let mut charges: Vec<Option<u32>> =
                rows.iter().map(|&r| Some(table.row(r).charge)).collect();
            charges.resize(width, None);

            let mut matrix = vec![vec![None; width]; width];
            for (a, &ra) in rows.iter().enumerate() {
                for (b, &rb) in rows.iter().enumerate().skip(a) {
                    let (x, y): (Vec<f64>, Vec<f64>) = columns
                        .iter()
                        .filter_map(|&c| {
                            Some((table.get(ra, Field::Uptake, c)?, table.get(rb, Field::Uptake, c)?))
                        })
                        .unzip();
                    let r = pearson(&x, &y);
                    matrix[a][b] = r;
                    matrix[b][a] = r;
                }
            }
            correlations.push(ChargeCorrelation {
                sequence: sequence.clone(),
                charges,
                matrix,
            });
        }
        out.push(ConditionChargeCorrelation {
            condition: cond.label,
            groups: correlations,
        });
    }
    Ok(out)
}

/// Lowest correlation of each peptide with any other charge state of its
/// sequence, across conditions. Peptides seen at a single charge have no
/// statistic.
pub fn charge_outliers(
    table: &HdxTable,
    results: &[ConditionChargeCorrelation],
    min_correlation: f64,
) -> Vec<OutlierRecord> {
    let mut lowest: HashMap<(String, u32), f64> = HashMap::new();
    for cond in results {
        for group in &cond.groups {
            for (a, charge) in group.charges.iter().enumerate() {
                let Some(charge) = charge else {
                    continue;
                };
                for (b, r) in group.matrix[a].iter().enumerate() {
                    let Some(r) = r else {
                        continue;
                    };
                    if a == b {
                        continue;
                    }
                    let entry = lowest
                        .entry((group.sequence.clone(), *charge))
                        .or_insert(*r);
                    *entry = entry.min(*r);
                }
            }
        }
    }

    table
        .rows()
        .iter()
        .map(|row| {
            let stat = lowest.get(&(row.sequence.clone(), row.charge)).copied();
            OutlierRecord {
                feature: row.feature.clone(),
                statistic: stat,
                outlier: stat.is_some_and(|r| r < min_correlation),
            }
        })
        .collect()
}
