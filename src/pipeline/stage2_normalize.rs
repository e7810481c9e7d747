use anyhow::Result;
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::table::Design;
use crate::table::normalize::normalize;

pub struct Stage2Normalize;

impl Stage2Normalize {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Normalize {
    fn name(&self) -> &'static str {
        "stage2_normalize"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let normalized = normalize(&ctx.records, ctx.states.as_deref(), &ctx.config)?;
        if !normalized.fd_rows.is_empty() {
            let message = format!(
                "{} fully deuterated rows kept out of the uptake table",
                normalized.fd_rows.len()
            );
            warn!(fd_rows = normalized.fd_rows.len(), "fully deuterated rows segregated");
            ctx.warn(message);
        }
        let design = Design::from_table(&normalized.table);
        info!(
            conditions = design.experiment.len(),
            columns_per_condition = design.timepoints.len(),
            "design_resolved"
        );
        ctx.design = Some(design);
        ctx.normalized = Some(normalized);
        Ok(())
    }
}
