use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::scores::drift::drift_outliers;

pub struct Stage6Drift;

impl Stage6Drift {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage6Drift {
    fn name(&self) -> &'static str {
        "stage6_drift"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let table = ctx.table.as_ref().context("filtered table missing")?;
        let multiplier = ctx.config.iqr_multiplier;
        let retention = drift_outliers(table, ctx.config.retention, multiplier);
        let mobility = drift_outliers(table, ctx.config.mobility, multiplier);
        info!(
            rt_shifts = retention.left.len() + retention.right.len(),
            rt_flagged = retention.flagged(),
            ims_shifts = mobility.left.len() + mobility.right.len(),
            ims_flagged = mobility.flagged(),
            "drift_outliers_computed"
        );
        ctx.retention = Some(retention);
        ctx.mobility = Some(mobility);
        Ok(())
    }
}
