use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::table::format_timepoint;

pub fn format_summary(ctx: &Ctx) -> Result<String> {
    let version = env!("CARGO_PKG_VERSION");
    let normalized = ctx.normalized.as_ref().context("normalized table missing")?;
    let table = ctx.table.as_ref().context("filtered table missing")?;
    let summary = ctx.summary.as_ref().context("summary table missing")?;

    let timepoints: Vec<String> = normalized
        .table
        .timepoints()
        .iter()
        .map(|t| format_timepoint(*t))
        .collect();

    let mut out = String::new();
    out.push_str(&format!("kira-hdxqc v{}\n", version));
    out.push_str(&format!(
        "Input: {} peptides, {} conditions ({}), timepoints [{}]\n",
        normalized.table.n_rows(),
        normalized.table.conditions().len(),
        normalized.table.conditions().join(", "),
        timepoints.join(", ")
    ));
    if let Some(m) = &ctx.missingness {
        out.push_str(&format!(
            "Missing not at random: {} (threshold {}, removed {})\n",
            m.flagged(),
            m.threshold,
            m.removed
        ));
    }
    out.push_str(&format!("Analysed: {} peptides\n", table.n_rows()));

    let mut fired = Vec::new();
    for name in &summary.columns {
        let n = summary.flagged(name).len();
        if n > 0 {
            fired.push(format!("{}={}", name, n));
        }
    }
    if fired.is_empty() {
        out.push_str("Flags: none\n");
    } else {
        out.push_str(&format!("Flags: {}\n", fired.join(", ")));
    }
    if !ctx.warnings.is_empty() {
        out.push_str(&format!("Warnings: {}\n", ctx.warnings.len()));
    }

    Ok(out)
}
