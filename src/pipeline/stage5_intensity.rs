use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::scores::intensity::intensity_outliers;

pub struct Stage5Intensity;

impl Stage5Intensity {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage5Intensity {
    fn name(&self) -> &'static str {
        "stage5_intensity"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let table = ctx.table.as_ref().context("filtered table missing")?;
        let result = intensity_outliers(table, ctx.config.intensity_field)?;
        info!(
            fitted = result.points.len(),
            threshold = result.threshold,
            flagged = result.records.iter().filter(|r| r.outlier).count(),
            "intensity_outliers_computed"
        );
        if result.excluded > 0 {
            ctx.warn(format!(
                "{} peptides excluded from the intensity trend fit",
                result.excluded
            ));
        }
        ctx.intensity = Some(result);
        Ok(())
    }
}
