use anyhow::{Context, Result, bail};
use tracing::warn;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::scores::missingness::{classify_missing, impute_zero};
use crate::table::Design;

pub struct Stage3Missingness;

impl Stage3Missingness {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Missingness {
    fn name(&self) -> &'static str {
        "stage3_missingness"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let normalized = ctx.normalized.as_ref().context("normalized table missing")?;
        let (filtered, result) = classify_missing(
            &normalized.table,
            ctx.config.missing_threshold,
            ctx.config.filter_missing,
        )?;
        if filtered.n_rows() == 0 {
            bail!(
                "every peptide exceeds the missingness threshold {}; nothing left to analyse",
                result.threshold
            );
        }
        if result.removed > 0 {
            warn!(removed = result.removed, "peptides removed as missing not at random");
            ctx.warn(format!(
                "{} peptides removed as missing not at random",
                result.removed
            ));
        }

        let (imputed, cells) = impute_zero(&filtered, ctx.config.impute);
        ctx.imputed_cells = cells;
        ctx.design = Some(Design::from_table(&imputed));
        ctx.table = Some(imputed);
        ctx.missingness = Some(result);
        Ok(())
    }
}
