use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::io::{json_writer, plots, tsv_writer};
use crate::pipeline::Stage;

pub struct Stage12Output;

impl Stage12Output {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage12Output {
    fn name(&self) -> &'static str {
        "stage12_output"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let report = json_writer::build_report(ctx)?;
        ctx.report = report;

        if ctx.write_tsv {
            let summary = ctx.summary.as_ref().context("summary table missing")?;
            tsv_writer::write_summary(&ctx.output.tsv_path, summary)?;
        }
        if ctx.write_json {
            json_writer::write_json(&ctx.output.json_path, &ctx.report)?;
        }
        if ctx.write_plots {
            plots::write_plot_data(&ctx.output.plots_dir, ctx)?;
        }

        info!("stage12_output_ready");
        Ok(())
    }
}
