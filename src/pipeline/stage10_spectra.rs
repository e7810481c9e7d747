use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::spectra::{spectral_outliers, spectral_similarity};

pub struct Stage10Spectra;

impl Stage10Spectra {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage10Spectra {
    fn name(&self) -> &'static str {
        "stage10_spectra"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        if ctx.peaks_path.is_none() {
            info!("no peak table supplied; spectral similarity skipped");
            return Ok(());
        }
        let normalized = ctx.normalized.as_ref().context("normalized table missing")?;
        let result = spectral_similarity(
            &ctx.peaks,
            &ctx.records,
            normalized,
            &ctx.config.spectral,
            &ctx.config.missing_token,
            ctx.threads,
        )?;
        if result.skipped > 0 {
            ctx.warn(format!(
                "{} peak rows without usable peaks skipped",
                result.skipped
            ));
        }
        if let Some(table) = &ctx.table {
            ctx.spectral_outliers = Some(spectral_outliers(
                table,
                &result,
                ctx.config.spectral.similarity_min,
            ));
        }
        ctx.spectral = Some(result);
        Ok(())
    }
}
