use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Result;
use flate2::read::GzDecoder;

pub mod json_writer;
pub mod plots;
pub mod summary;
pub mod tsv_writer;

pub(crate) fn open_maybe_gz(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path)?;
    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        let decoder = GzDecoder::new(file);
        Ok(Box::new(decoder))
    } else {
        Ok(Box::new(file))
    }
}

/// Cell text for an optional statistic. Undefined and non-finite values are
/// written as `NA`.
pub(crate) fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.6}", v),
        _ => "NA".to_string(),
    }
}
