use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::input;
use crate::pipeline::Stage;

pub struct Stage1Input;

impl Stage1Input {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Input {
    fn name(&self) -> &'static str {
        "stage1_input"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        ctx.records = input::read_export(&ctx.input, &ctx.config.columns)?;
        if let Some(path) = &ctx.peaks_path {
            ctx.peaks = input::read_peaks(
                path,
                &ctx.config.columns,
                ctx.config.spectral.base_mz_column,
            )?;
        }
        info!(
            export_rows = ctx.records.len(),
            peak_rows = ctx.peaks.len(),
            "stage1_input_ready"
        );
        Ok(())
    }
}
