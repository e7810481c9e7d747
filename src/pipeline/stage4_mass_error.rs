use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::scores::mass_error::compute_mass_error;

pub struct Stage4MassError;

impl Stage4MassError {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4MassError {
    fn name(&self) -> &'static str {
        "stage4_mass_error"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let table = ctx.table.as_ref().context("filtered table missing")?;
        let result = compute_mass_error(table, ctx.config.mass_error_ppm_tolerance);
        info!(
            points = result.points.len(),
            flagged = result.per_peptide.iter().filter(|r| r.outlier).count(),
            "mass_error_computed"
        );
        ctx.mass_error = Some(result);
        Ok(())
    }
}
