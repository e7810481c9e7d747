use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::scores::replicate::{replicate_correlation, replicate_outlier};

pub struct Stage8Replicates;

impl Stage8Replicates {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage8Replicates {
    fn name(&self) -> &'static str {
        "stage8_replicates"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let table = ctx.table.as_ref().context("filtered table missing")?;
        let design = ctx.design.as_ref().context("design missing")?;
        let variance =
            replicate_correlation(table, design, ctx.config.replicate_variance_quantile)?;
        let skew = replicate_outlier(table, design, ctx.config.replicate_skew_quantile)?;
        info!(
            variance_flagged = variance.iter().map(|c| c.flagged().count()).sum::<usize>(),
            skew_flagged = skew.iter().map(|c| c.flagged().count()).sum::<usize>(),
            "replicate_statistics_computed"
        );
        ctx.replicate_variance = Some(variance);
        ctx.replicate_skew = Some(skew);
        Ok(())
    }
}
