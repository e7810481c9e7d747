use anyhow::{Result, bail};

use crate::table::HdxTable;

/// Experimental design supplied once per analysis: condition labels and one
/// timepoint per replicate-expanded column of each condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    pub experiment: Vec<String>,
    pub timepoints: Vec<f64>,
}

/// Columns of one condition paired positionally with the design timepoints.
#[derive(Debug, Clone)]
pub struct ConditionColumns {
    pub label: String,
    pub condition: usize,
    pub columns: Vec<usize>,
}

impl Design {
    pub fn new(experiment: Vec<String>, timepoints: Vec<f64>) -> Self {
        Self {
            experiment,
            timepoints,
        }
    }

    /// Design covering every condition of `table`, timepoints taken from the
    /// column layout.
    pub fn from_table(table: &HdxTable) -> Self {
        let timepoints = table
            .condition_columns(0)
            .into_iter()
            .map(|c| table.sample_timepoint(c))
            .collect();
        Self {
            experiment: table.conditions().to_vec(),
            timepoints,
        }
    }

    pub fn resolve(&self, table: &HdxTable) -> Result<Vec<ConditionColumns>> {
        if self.experiment.is_empty() {
            bail!("design requires at least one experiment label");
        }
        if self.timepoints.is_empty() {
            bail!("design requires timepoints");
        }
        let mut out = Vec::with_capacity(self.experiment.len());
        for label in &self.experiment {
            let Some(condition) = table.condition_index(label) else {
                bail!(
                    "experiment '{}' not found in table conditions [{}]",
                    label,
                    table.conditions().join(", ")
                );
            };
            let columns = table.condition_columns(condition);
            if columns.len() != self.timepoints.len() {
                bail!(
                    "experiment '{}' has {} columns but {} timepoints were supplied",
                    label,
                    columns.len(),
                    self.timepoints.len()
                );
            }
            out.push(ConditionColumns {
                label: label.clone(),
                condition,
                columns,
            });
        }
        Ok(out)
    }

    /// Positions into a condition's columns grouped by distinct timepoint,
    /// ascending.
    pub fn timepoint_groups(&self) -> Vec<(f64, Vec<usize>)> {
        let mut distinct: Vec<f64> = self.timepoints.clone();
        distinct.sort_by(|a, b| a.total_cmp(b));
        distinct.dedup();
        distinct
            .into_iter()
            .map(|t| {
                let positions = self
                    .timepoints
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| **v == t)
                    .map(|(i, _)| i)
                    .collect();
                (t, positions)
            })
            .collect()
    }
}
