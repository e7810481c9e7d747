//! Readers for the vendor exports. Values are kept as raw strings here;
//! all typing and defaulting happens in the normalizer.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::config::ColumnNames;
use crate::io::open_maybe_gz;

#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    pub line: u64,
    pub sequence: String,
    pub charge: String,
    pub state: String,
    pub deut_time: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub actual_rt: Option<String>,
    pub ims_range: Option<String>,
    pub uptake: Option<String>,
    pub search_rt: Option<String>,
    pub search_ims: Option<String>,
    pub spectra: Option<String>,
    pub max_intensity: Option<String>,
    pub exp_centroid: Option<String>,
    pub theor_centroid: Option<String>,
    pub score: Option<String>,
    pub confidence: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PeakRecord {
    pub line: u64,
    pub state: String,
    pub deut_time: Option<String>,
    pub start_rt: Option<String>,
    pub end_rt: Option<String>,
    pub charge: Option<String>,
    pub incorporation: Option<String>,
    pub max_incorporation: Option<String>,
    pub base_mz: String,
    pub intensities: Vec<String>,
}

/// Lowercase ASCII alphanumerics of a header, used for alias matching.
pub fn canonical_header(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

struct HeaderIndex {
    canonical: Vec<String>,
}

impl HeaderIndex {
    fn new(headers: &csv::StringRecord) -> Self {
        Self {
            canonical: headers.iter().map(canonical_header).collect(),
        }
    }

    fn find(&self, aliases: &[String]) -> Option<usize> {
        aliases.iter().find_map(|alias| {
            let key = canonical_header(alias);
            self.canonical.iter().position(|h| *h == key)
        })
    }

    fn require(&self, aliases: &[String], source: &str) -> Result<usize> {
        self.find(aliases).with_context(|| {
            format!(
                "{}: missing required column (accepted names: {})",
                source,
                aliases.join(", ")
            )
        })
    }
}

fn delimiter_for(path: &Path) -> u8 {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if name.ends_with(".tsv") || name.ends_with(".tsv.gz") {
        b'\t'
    } else {
        b','
    }
}

fn reader_for<R: Read>(reader: R, delimiter: u8) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn field(record: &csv::StringRecord, idx: Option<usize>) -> Option<String> {
    idx.map(|i| record.get(i).unwrap_or_default().to_string())
}

pub fn read_export(path: &Path, columns: &ColumnNames) -> Result<Vec<RawRecord>> {
    let reader = open_maybe_gz(path)
        .with_context(|| format!("failed to open export {}", path.display()))?;
    let records = parse_export(
        reader,
        delimiter_for(path),
        columns,
        &path.display().to_string(),
    )?;
    info!(path = %path.display(), rows = records.len(), "export_loaded");
    Ok(records)
}

pub fn parse_export<R: Read>(
    reader: R,
    delimiter: u8,
    columns: &ColumnNames,
    source: &str,
) -> Result<Vec<RawRecord>> {
    let mut rdr = reader_for(reader, delimiter);
    let headers = rdr
        .headers()
        .with_context(|| format!("{}: failed to read header row", source))?
        .clone();
    let index = HeaderIndex::new(&headers);

    let sequence = index.require(&columns.sequence, source)?;
    let charge = index.require(&columns.charge, source)?;
    let state = index.require(&columns.state, source)?;
    let deut_time = index.require(&columns.deut_time, source)?;
    let uptake = index.require(&columns.uptake, source)?;
    let start = index.find(&columns.start);
    let end = index.find(&columns.end);
    let actual_rt = index.find(&columns.actual_rt);
    let ims_range = index.find(&columns.ims_range);
    let search_rt = index.find(&columns.search_rt);
    let search_ims = index.find(&columns.search_ims);
    let spectra = index.find(&columns.spectra);
    let max_intensity = index.find(&columns.max_intensity);
    let exp_centroid = index.find(&columns.exp_centroid);
    let theor_centroid = index.find(&columns.theor_centroid);
    let score = index.find(&columns.score);
    let confidence = index.find(&columns.confidence);

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result.with_context(|| format!("{}: malformed row", source))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.iter().all(|v| v.is_empty()) {
            continue;
        }
        out.push(RawRecord {
            line,
            sequence: record.get(sequence).unwrap_or_default().to_string(),
            charge: record.get(charge).unwrap_or_default().to_string(),
            state: record.get(state).unwrap_or_default().to_string(),
            deut_time: record.get(deut_time).unwrap_or_default().to_string(),
            start: field(&record, start),
            end: field(&record, end),
            actual_rt: field(&record, actual_rt),
            ims_range: field(&record, ims_range),
            uptake: field(&record, Some(uptake)),
            search_rt: field(&record, search_rt),
            search_ims: field(&record, search_ims),
            spectra: field(&record, spectra),
            max_intensity: field(&record, max_intensity),
            exp_centroid: field(&record, exp_centroid),
            theor_centroid: field(&record, theor_centroid),
            score: field(&record, score),
            confidence: field(&record, confidence),
        });
    }

    if out.is_empty() {
        bail!("{}: export contains no data rows", source);
    }
    Ok(out)
}

pub fn read_peaks(
    path: &Path,
    columns: &ColumnNames,
    base_mz_column: usize,
) -> Result<Vec<PeakRecord>> {
    let reader = open_maybe_gz(path)
        .with_context(|| format!("failed to open peak table {}", path.display()))?;
    let records = parse_peaks(
        reader,
        delimiter_for(path),
        columns,
        base_mz_column,
        &path.display().to_string(),
    )?;
    info!(path = %path.display(), rows = records.len(), "peak_table_loaded");
    Ok(records)
}

pub fn parse_peaks<R: Read>(
    reader: R,
    delimiter: u8,
    columns: &ColumnNames,
    base_mz_column: usize,
    source: &str,
) -> Result<Vec<PeakRecord>> {
    let mut rdr = reader_for(reader, delimiter);
    let headers = rdr
        .headers()
        .with_context(|| format!("{}: failed to read header row", source))?
        .clone();
    if base_mz_column + 1 >= headers.len() {
        bail!(
            "{}: base m/z column {} leaves no intensity columns ({} columns)",
            source,
            base_mz_column,
            headers.len()
        );
    }
    let index = HeaderIndex::new(&headers);
    let state = index.require(&columns.state, source)?;
    let deut_time = index.find(&columns.deut_time);
    let start_rt = index.find(&columns.start_rt);
    let end_rt = index.find(&columns.end_rt);
    let charge = index.find(&columns.charge);
    let incorporation = index.find(&columns.incorporation);
    let max_incorporation = index.find(&columns.max_incorporation);

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result.with_context(|| format!("{}: malformed row", source))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.iter().all(|v| v.is_empty()) {
            continue;
        }
        out.push(PeakRecord {
            line,
            state: record.get(state).unwrap_or_default().to_string(),
            deut_time: field(&record, deut_time),
            start_rt: field(&record, start_rt),
            end_rt: field(&record, end_rt),
            charge: field(&record, charge),
            incorporation: field(&record, incorporation),
            max_incorporation: field(&record, max_incorporation),
            base_mz: record.get(base_mz_column).unwrap_or_default().to_string(),
            intensities: record
                .iter()
                .skip(base_mz_column + 1)
                .map(|v| v.to_string())
                .collect(),
        });
    }

    if out.is_empty() {
        bail!("{}: peak table contains no data rows", source);
    }
    Ok(out)
}
