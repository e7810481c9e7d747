use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::scores::monotonicity::compute_monotonicity;

pub struct Stage7Monotonicity;

impl Stage7Monotonicity {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage7Monotonicity {
    fn name(&self) -> &'static str {
        "stage7_monotonicity"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let table = ctx.table.as_ref().context("filtered table missing")?;
        let design = ctx.design.as_ref().context("design missing")?;
        let result = compute_monotonicity(table, design, ctx.config.monotonicity_quantile)?;
        for cond in &result {
            info!(
                condition = %cond.condition,
                threshold = ?cond.threshold,
                flagged = cond.flagged().count(),
                "monotonicity_computed"
            );
        }
        ctx.monotonicity = Some(result);
        Ok(())
    }
}
