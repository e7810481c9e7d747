use std::collections::{BTreeSet, HashMap, HashSet};

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::config::QcConfig;
use crate::input::RawRecord;
use crate::table::{Confidence, Field, HdxTable, PeptideRow, SampleKey};

/// A fully deuterated control measurement, kept out of the pivot.
#[derive(Debug, Clone)]
pub struct FdRow {
    pub sequence: String,
    pub charge: u32,
    pub condition: String,
    pub uptake: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub table: HdxTable,
    pub fd_rows: Vec<FdRow>,
    /// Raw export state to condition label.
    pub state_labels: Vec<(String, String)>,
}

impl Normalized {
    pub fn label_for(&self, raw_state: &str) -> Option<&str> {
        self.state_labels
            .iter()
            .find(|(raw, _)| raw == raw_state)
            .map(|(_, label)| label.as_str())
    }
}

struct ParsedRow<'a> {
    record: &'a RawRecord,
    charge: u32,
    seconds: f64,
}

pub fn normalize(
    records: &[RawRecord],
    states: Option<&[String]>,
    cfg: &QcConfig,
) -> Result<Normalized> {
    if records.is_empty() {
        bail!("cannot normalize an empty export");
    }
    let na = cfg.missing_token.as_str();

    let mut parsed = Vec::with_capacity(records.len());
    let mut fd_raw = Vec::new();
    for record in records {
        if record.sequence.trim().is_empty() {
            bail!("line {}: empty sequence", record.line);
        }
        let charge: u32 = record
            .charge
            .trim()
            .parse()
            .with_context(|| format!("line {}: invalid charge '{}'", record.line, record.charge))?;
        if record.deut_time.trim().eq_ignore_ascii_case(&cfg.fd_token) {
            fd_raw.push((record, charge));
            continue;
        }
        let seconds = parse_timepoint(&record.deut_time)
            .with_context(|| format!("line {}: invalid deuteration time", record.line))?;
        parsed.push(ParsedRow {
            record,
            charge,
            seconds,
        });
    }
    if parsed.is_empty() {
        bail!("export contains only fully deuterated rows");
    }

    let mut raw_states: Vec<&str> = Vec::new();
    for row in &parsed {
        if !raw_states.contains(&row.record.state.as_str()) {
            raw_states.push(row.record.state.as_str());
        }
    }
    let labels = rename_states(&raw_states, states)?;
    let label_of: HashMap<&str, usize> = raw_states
        .iter()
        .enumerate()
        .map(|(i, s)| (*s, i))
        .collect();

    let mut timepoints: Vec<f64> = parsed.iter().map(|r| r.seconds).collect();
    timepoints.sort_by(|a, b| a.total_cmp(b));
    timepoints.dedup();
    let time_index = |s: f64| timepoints.iter().position(|t| *t == s).unwrap_or(0);

    // Replicate index within (timepoint, sequence, condition, charge), in
    // encounter order.
    let mut counters: HashMap<(u64, &str, &str, u32), usize> = HashMap::new();
    let mut keyed = Vec::with_capacity(parsed.len());
    let mut slots = BTreeSet::new();
    for row in &parsed {
        let counter = counters
            .entry((
                row.seconds.to_bits(),
                row.record.sequence.as_str(),
                row.record.state.as_str(),
                row.charge,
            ))
            .or_insert(0);
        let key = SampleKey {
            condition: label_of[row.record.state.as_str()],
            timepoint: time_index(row.seconds),
            replicate: *counter,
        };
        *counter += 1;
        slots.insert((key.timepoint, key.replicate));
        keyed.push((row, key));
    }

    let slots: Vec<(usize, usize)> = slots.into_iter().collect();
    let mut table = HdxTable::new(labels, timepoints.clone(), &slots)?;

    for (row, key) in keyed {
        let rec = row.record;
        let sequence = rec.sequence.trim();
        let idx = match table.row_of(sequence, row.charge) {
            Some(idx) => idx,
            None => {
                let start = parse_integer(rec.start.as_deref(), na)
                    .with_context(|| format!("line {}: invalid start", rec.line))?;
                let end = parse_integer(rec.end.as_deref(), na)
                    .with_context(|| format!("line {}: invalid end", rec.line))?;
                table.push_row(PeptideRow::new(sequence, row.charge, start, end))?
            }
        };
        let column = table
            .column(key)
            .context("sample column missing after pivot")?;
        let ctx = |name: &str| format!("line {}: invalid {}", rec.line, name);

        let (left_rt, right_rt) =
            parse_range(rec.actual_rt.as_deref(), na).with_context(|| ctx("Actual RT"))?;
        let (left_ims, right_ims) =
            parse_range(rec.ims_range.as_deref(), na).with_context(|| ctx("IMS Range"))?;

        let cells = [
            (
                Field::Uptake,
                parse_uptake(rec.uptake.as_deref(), na).with_context(|| ctx("uptake"))?,
            ),
            (Field::LeftRt, left_rt),
            (Field::RightRt, right_rt),
            (
                Field::SearchRt,
                parse_number(rec.search_rt.as_deref(), na).with_context(|| ctx("Search RT"))?,
            ),
            (Field::LeftIms, left_ims),
            (Field::RightIms, right_ims),
            (
                Field::SearchIms,
                parse_number(rec.search_ims.as_deref(), na).with_context(|| ctx("Search IMS"))?,
            ),
            (
                Field::Spectra,
                parse_number(rec.spectra.as_deref(), na).with_context(|| ctx("spectra"))?,
            ),
            (
                Field::MaxIntensity,
                parse_number(rec.max_intensity.as_deref(), na)
                    .with_context(|| ctx("Max Inty"))?,
            ),
            (
                Field::ExpCentroid,
                parse_number(rec.exp_centroid.as_deref(), na).with_context(|| ctx("Exp Cent"))?,
            ),
            (
                Field::TheorCentroid,
                parse_number(rec.theor_centroid.as_deref(), na)
                    .with_context(|| ctx("Theor Cent"))?,
            ),
            (
                Field::Score,
                parse_number(rec.score.as_deref(), na).with_context(|| ctx("Score"))?,
            ),
        ];
        for (field, value) in cells {
            table.set(idx, field, column, value);
        }
        table.set_confidence(
            idx,
            column,
            rec.confidence.as_deref().and_then(Confidence::parse),
        );
    }

    let fd_rows = fd_raw
        .into_iter()
        .map(|(rec, charge)| {
            let condition = match label_of.get(rec.state.as_str()) {
                Some(&i) => table.conditions()[i].clone(),
                None => rec.state.clone(),
            };
            Ok(FdRow {
                sequence: rec.sequence.trim().to_string(),
                charge,
                condition,
                uptake: parse_uptake(rec.uptake.as_deref(), na)
                    .with_context(|| format!("line {}: invalid uptake", rec.line))?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let sequences: HashSet<&str> = table.rows().iter().map(|r| r.sequence.as_str()).collect();
    info!(
        sequences = sequences.len(),
        peptides = table.n_rows(),
        timepoints = timepoints.len(),
        conditions = table.conditions().len(),
        fd_rows = fd_rows.len(),
        "export_normalized"
    );

    let state_labels = raw_states
        .iter()
        .map(|s| s.to_string())
        .zip(table.conditions().iter().cloned())
        .collect();

    Ok(Normalized {
        table,
        fd_rows,
        state_labels,
    })
}

fn rename_states(raw: &[&str], states: Option<&[String]>) -> Result<Vec<String>> {
    match states {
        None => Ok(raw.iter().map(|s| s.to_string()).collect()),
        Some(names) => {
            if names.len() != raw.len() {
                bail!(
                    "{} condition names supplied but the export has {} distinct states ({})",
                    names.len(),
                    raw.len(),
                    raw.join(", ")
                );
            }
            let unique: HashSet<&String> = names.iter().collect();
            if unique.len() != names.len() {
                bail!("condition names must be unique");
            }
            Ok(names.to_vec())
        }
    }
}

fn is_missing(value: &str, na: &str) -> bool {
    value.eq_ignore_ascii_case(na)
}

/// Deuteration time in seconds. Accepts a bare number (seconds) or a number
/// followed by `s`, `sec`, `m`, `min` or `h`.
pub fn parse_timepoint(raw: &str) -> Result<f64> {
    let value = raw.trim();
    let split = value
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number: f64 = number
        .trim()
        .parse()
        .with_context(|| format!("'{}' is not a timepoint", raw))?;
    let scale = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "s" | "sec" => 1.0,
        "m" | "min" => 60.0,
        "h" | "hr" => 3600.0,
        other => bail!("unknown time unit '{}' in '{}'", other, raw),
    };
    if number < 0.0 {
        bail!("negative timepoint '{}'", raw);
    }
    Ok(number * scale)
}

pub fn parse_number(raw: Option<&str>, na: &str) -> Result<Option<f64>> {
    let Some(value) = raw.map(str::trim) else {
        return Ok(None);
    };
    if value.is_empty() || is_missing(value, na) {
        return Ok(None);
    }
    let parsed: f64 = value
        .parse()
        .with_context(|| format!("'{}' is not a number", value))?;
    if !parsed.is_finite() {
        bail!("'{}' is not a finite number", value);
    }
    Ok(Some(parsed))
}

/// Uptake is the one field where a blank cell means zero.
pub fn parse_uptake(raw: Option<&str>, na: &str) -> Result<Option<f64>> {
    match raw.map(str::trim) {
        Some("") => Ok(Some(0.0)),
        other => parse_number(other, na),
    }
}

fn parse_integer(raw: Option<&str>, na: &str) -> Result<Option<i64>> {
    match parse_number(raw, na)? {
        Some(v) if v.fract() == 0.0 => Ok(Some(v as i64)),
        Some(v) => bail!("'{}' is not an integer", v),
        None => Ok(None),
    }
}

/// Splits an `a-b` window into its bounds.
pub fn parse_range(raw: Option<&str>, na: &str) -> Result<(Option<f64>, Option<f64>)> {
    let Some(value) = raw.map(str::trim) else {
        return Ok((None, None));
    };
    if value.is_empty() || is_missing(value, na) {
        return Ok((None, None));
    }
    // The separator is a `-` that is neither a leading sign nor an exponent
    // sign.
    let bytes = value.as_bytes();
    let Some(pos) = (1..bytes.len())
        .find(|&i| bytes[i] == b'-' && !matches!(bytes[i - 1], b'e' | b'E'))
    else {
        bail!("'{}' is not a range of the form a-b", value);
    };
    let left = parse_number(Some(&value[..pos]), na)?;
    let right = parse_number(Some(&value[pos + 1..]), na)?;
    Ok((left, right))
}
