use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::scores::aggregate::charge_groups_scored;
use crate::scores::charge::{charge_correlation, charge_outliers};
use crate::scores::compatible::compatible_uptake;

/// Diagnostics comparing peptides with each other: charge states of one
/// sequence, and overlapping sequences.
pub struct Stage9Overlap;

impl Stage9Overlap {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage9Overlap {
    fn name(&self) -> &'static str {
        "stage9_overlap"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let table = ctx.table.as_ref().context("filtered table missing")?;
        let design = ctx.design.as_ref().context("design missing")?;

        let correlations = charge_correlation(table, design)?;
        let outliers = charge_outliers(table, &correlations, ctx.config.charge_correlation_min);
        let compatible = compatible_uptake(table, design, ctx.config.overlap)?;
        info!(
            charge_groups = charge_groups_scored(&correlations),
            charge_flagged = outliers.iter().filter(|r| r.outlier).count(),
            compatible_flagged = compatible.violations.len(),
            "overlap_diagnostics_computed"
        );

        ctx.charge = Some(correlations);
        ctx.charge_outliers = Some(outliers);
        ctx.compatible = Some(compatible);
        Ok(())
    }
}
