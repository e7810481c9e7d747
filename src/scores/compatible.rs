//! Uptake consistency between overlapping peptides.
//!
//! Two peptides sharing most of their residues cannot differ in uptake by
//! more than the difference in their exchangeable amide counts.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use tracing::warn;

use crate::math::stats::mean;
use crate::table::{Design, Field, HdxTable, format_timepoint};

#[derive(Debug, Clone, Default)]
pub struct CompatibleResult {
    /// Violating feature to the `condition_timepoint` labels where the
    /// violation occurs.
    pub violations: BTreeMap<String, BTreeSet<String>>,
}

impl CompatibleResult {
    pub fn is_flagged(&self, feature: &str) -> bool {
        self.violations.contains_key(feature)
    }
}

/// Backbone amides able to exchange: every residue except the N-terminal
/// one and prolines.
pub fn exchangeable_amides(sequence: &str) -> usize {
    sequence
        .chars()
        .skip(1)
        .filter(|c| !c.eq_ignore_ascii_case(&'P'))
        .count()
}

/// Residues of the longer span not covered by the other span.
pub fn non_overlap(a: (i64, i64), b: (i64, i64)) -> usize {
    let len_a = (a.1 - a.0 + 1).max(0);
    let len_b = (b.1 - b.0 + 1).max(0);
    let shared = (a.1.min(b.1) - a.0.max(b.0) + 1).max(0);
    (len_a.max(len_b) - shared) as usize
}

pub fn compatible_uptake(
    table: &HdxTable,
    design: &Design,
    overlap: usize,
) -> Result<CompatibleResult> {
    let conditions = design.resolve(table)?;
    let groups = design.timepoint_groups();

    // Replicate-mean uptake per row, condition and timepoint.
    let mut means: Vec<Vec<Vec<Option<f64>>>> = Vec::with_capacity(table.n_rows());
    for row in 0..table.n_rows() {
        let per_condition = conditions
            .iter()
            .map(|cond| {
                groups
                    .iter()
                    .map(|(_, positions)| {
                        let columns: Vec<usize> =
                            positions.iter().map(|&p| cond.columns[p]).collect();
                        mean(&table.present(row, Field::Uptake, &columns))
                    })
                    .collect()
            })
            .collect();
        means.push(per_condition);
    }

    let spans: Vec<Option<(i64, i64)>> = table
        .rows()
        .iter()
        .map(|r| match (r.start, r.end) {
            (Some(s), Some(e)) if e >= s => Some((s, e)),
            _ => None,
        })
        .collect();
    let unplaced = spans.iter().filter(|s| s.is_none()).count();
    if unplaced > 0 {
        warn!(unplaced, "peptides without start/end skipped for compatible uptake");
    }

    let mut result = CompatibleResult::default();
    for i in 0..table.n_rows() {
        let Some(span_i) = spans[i] else {
            continue;
        };
        let row_i = table.row(i);
        let exch_i = exchangeable_amides(&row_i.sequence);
        for j in 0..table.n_rows() {
            if i == j {
                continue;
            }
            let Some(span_j) = spans[j] else {
                continue;
            };
            let row_j = table.row(j);
            if row_j.charge != row_i.charge || non_overlap(span_i, span_j) > overlap {
                continue;
            }
            let bound = exch_i.abs_diff(exchangeable_amides(&row_j.sequence)) as f64;
            for (c, cond) in conditions.iter().enumerate() {
                for (g, (t, _)) in groups.iter().enumerate() {
                    let (Some(ui), Some(uj)) = (means[i][c][g], means[j][c][g]) else {
                        continue;
                    };
                    if (ui - uj).abs() > bound {
                        result
                            .violations
                            .entry(row_i.feature.clone())
                            .or_default()
                            .insert(format!("{}_{}", cond.label, format_timepoint(*t)));
                    }
                }
            }
        }
    }

    Ok(result)
}
