use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::scores::aggregate::SummaryTable;

pub fn write_summary(path: &Path, summary: &SummaryTable) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);

    writeln!(w, "feature\t{}", summary.columns.join("\t"))?;
    for row in &summary.rows {
        if row.values.len() != summary.columns.len() {
            bail!(
                "summary row {} has {} values for {} columns",
                row.feature,
                row.values.len(),
                summary.columns.len()
            );
        }
        let values: Vec<String> = row.values.iter().map(|v| v.to_string()).collect();
        writeln!(w, "{}\t{}", row.feature, values.join("\t"))?;
    }
    w.flush()?;
    Ok(())
}
