use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::scores::aggregate::{QcResults, quality_control};

pub struct Stage11Summary;

impl Stage11Summary {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage11Summary {
    fn name(&self) -> &'static str {
        "stage11_summary"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let results = QcResults {
            missingness: ctx.missingness.as_ref().context("missingness result missing")?,
            mass_error: ctx.mass_error.as_ref().context("mass error result missing")?,
            intensity: ctx.intensity.as_ref().context("intensity result missing")?,
            retention: ctx.retention.as_ref().context("retention result missing")?,
            mobility: ctx.mobility.as_ref().context("mobility result missing")?,
            monotonicity: ctx
                .monotonicity
                .as_deref()
                .context("monotonicity result missing")?,
            charge: ctx
                .charge_outliers
                .as_deref()
                .context("charge correlation result missing")?,
            compatible: ctx.compatible.as_ref().context("compatible uptake missing")?,
            replicate_variance: ctx
                .replicate_variance
                .as_deref()
                .context("replicate variance result missing")?,
            replicate_skew: ctx
                .replicate_skew
                .as_deref()
                .context("replicate skew result missing")?,
            spectral: ctx.spectral_outliers.as_deref(),
        };
        let summary = quality_control(results);
        info!(
            peptides = summary.rows.len(),
            columns = summary.columns.len(),
            "summary_table_built"
        );
        ctx.summary = Some(summary);
        Ok(())
    }
}
