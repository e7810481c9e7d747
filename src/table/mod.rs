//! Wide peptide × sample table with structured column addressing.
//!
//! Every measured field has its own row-major matrix. A cell is addressed
//! by `(row, Field, column)` where the column is resolved from a
//! [`SampleKey`]; no column names are parsed after normalization.

use std::collections::HashMap;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

pub mod design;
pub mod normalize;

pub use design::{ConditionColumns, Design};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Uptake,
    LeftRt,
    RightRt,
    SearchRt,
    LeftIms,
    RightIms,
    SearchIms,
    Spectra,
    MaxIntensity,
    ExpCentroid,
    TheorCentroid,
    Score,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::Uptake,
        Field::LeftRt,
        Field::RightRt,
        Field::SearchRt,
        Field::LeftIms,
        Field::RightIms,
        Field::SearchIms,
        Field::Spectra,
        Field::MaxIntensity,
        Field::ExpCentroid,
        Field::TheorCentroid,
        Field::Score,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Uptake => "uptake",
            Field::LeftRt => "left_rt",
            Field::RightRt => "right_rt",
            Field::SearchRt => "search_rt",
            Field::LeftIms => "left_ims",
            Field::RightIms => "right_ims",
            Field::SearchIms => "search_ims",
            Field::Spectra => "spectra",
            Field::MaxIntensity => "max_intensity",
            Field::ExpCentroid => "exp_centroid",
            Field::TheorCentroid => "theor_centroid",
            Field::Score => "score",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Confidence::High),
            "medium" => Some(Confidence::Medium),
            "low" => Some(Confidence::Low),
            _ => None,
        }
    }
}

/// Zero-based `(condition, timepoint, replicate)` address of a sample column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SampleKey {
    pub condition: usize,
    pub timepoint: usize,
    pub replicate: usize,
}

#[derive(Debug, Clone)]
pub struct PeptideRow {
    pub sequence: String,
    pub charge: u32,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub feature: String,
    pub not_missing_at_random: bool,
}

impl PeptideRow {
    pub fn new(sequence: &str, charge: u32, start: Option<i64>, end: Option<i64>) -> Self {
        Self {
            sequence: sequence.to_string(),
            charge,
            start,
            end,
            feature: format!("{}{}", sequence, charge),
            not_missing_at_random: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HdxTable {
    conditions: Vec<String>,
    timepoints: Vec<f64>,
    samples: Vec<SampleKey>,
    sample_index: HashMap<SampleKey, usize>,
    rows: Vec<PeptideRow>,
    row_index: HashMap<(String, u32), usize>,
    values: Vec<Vec<Option<f64>>>,
    confidence: Vec<Option<Confidence>>,
}

impl HdxTable {
    /// Builds an empty table whose columns are every condition crossed with
    /// `slots`, the `(timepoint index, replicate index)` pairs shared by all
    /// conditions.
    pub fn new(
        conditions: Vec<String>,
        timepoints: Vec<f64>,
        slots: &[(usize, usize)],
    ) -> Result<Self> {
        if conditions.is_empty() {
            bail!("table requires at least one condition");
        }
        if timepoints.windows(2).any(|w| w[0] >= w[1]) {
            bail!("timepoints must be strictly increasing");
        }
        let mut slots = slots.to_vec();
        slots.sort_unstable();
        slots.dedup();
        if let Some(&(t, _)) = slots.iter().find(|(t, _)| *t >= timepoints.len()) {
            bail!("sample slot references unknown timepoint index {}", t);
        }

        let mut samples = Vec::with_capacity(conditions.len() * slots.len());
        for condition in 0..conditions.len() {
            for &(timepoint, replicate) in &slots {
                samples.push(SampleKey {
                    condition,
                    timepoint,
                    replicate,
                });
            }
        }
        let sample_index = samples.iter().enumerate().map(|(i, k)| (*k, i)).collect();

        Ok(Self {
            conditions,
            timepoints,
            samples,
            sample_index,
            rows: Vec::new(),
            row_index: HashMap::new(),
            values: vec![Vec::new(); Field::ALL.len()],
            confidence: Vec::new(),
        })
    }

    pub fn push_row(&mut self, row: PeptideRow) -> Result<usize> {
        let key = (row.sequence.clone(), row.charge);
        if self.row_index.contains_key(&key) {
            bail!("duplicate peptide {} charge {}", row.sequence, row.charge);
        }
        let idx = self.rows.len();
        self.row_index.insert(key, idx);
        self.rows.push(row);
        let n = self.samples.len();
        for matrix in &mut self.values {
            matrix.extend(std::iter::repeat_n(None, n));
        }
        self.confidence.extend(std::iter::repeat_n(None, n));
        Ok(idx)
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn rows(&self) -> &[PeptideRow] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> &PeptideRow {
        &self.rows[row]
    }

    pub fn row_of(&self, sequence: &str, charge: u32) -> Option<usize> {
        self.row_index.get(&(sequence.to_string(), charge)).copied()
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    pub fn timepoints(&self) -> &[f64] {
        &self.timepoints
    }

    pub fn samples(&self) -> &[SampleKey] {
        &self.samples
    }

    pub fn column(&self, key: SampleKey) -> Option<usize> {
        self.sample_index.get(&key).copied()
    }

    pub fn sample_timepoint(&self, column: usize) -> f64 {
        self.timepoints[self.samples[column].timepoint]
    }

    pub fn condition_index(&self, label: &str) -> Option<usize> {
        self.conditions.iter().position(|c| c == label)
    }

    pub fn condition_columns(&self, condition: usize) -> Vec<usize> {
        self.samples
            .iter()
            .enumerate()
            .filter(|(_, k)| k.condition == condition)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn get(&self, row: usize, field: Field, column: usize) -> Option<f64> {
        self.values[field.index()][row * self.samples.len() + column]
    }

    pub fn value(&self, row: usize, field: Field, key: SampleKey) -> Option<f64> {
        self.column(key).and_then(|c| self.get(row, field, c))
    }

    pub fn set(&mut self, row: usize, field: Field, column: usize, value: Option<f64>) {
        let n = self.samples.len();
        self.values[field.index()][row * n + column] = value;
    }

    pub fn row_values(&self, row: usize, field: Field) -> &[Option<f64>] {
        let n = self.samples.len();
        &self.values[field.index()][row * n..(row + 1) * n]
    }

    /// Present values of one row restricted to `columns`.
    pub fn present(&self, row: usize, field: Field, columns: &[usize]) -> Vec<f64> {
        columns
            .iter()
            .filter_map(|&c| self.get(row, field, c))
            .collect()
    }

    pub fn confidence(&self, row: usize, column: usize) -> Option<Confidence> {
        self.confidence[row * self.samples.len() + column]
    }

    pub fn set_confidence(&mut self, row: usize, column: usize, value: Option<Confidence>) {
        let n = self.samples.len();
        self.confidence[row * n + column] = value;
    }

    pub fn set_not_missing_at_random(&mut self, row: usize, flag: bool) {
        self.rows[row].not_missing_at_random = flag;
    }

    /// Copy of the table keeping only rows where `keep` is true.
    pub fn retain_rows(&self, keep: &[bool]) -> Result<HdxTable> {
        if keep.len() != self.rows.len() {
            bail!(
                "row mask length {} does not match table rows {}",
                keep.len(),
                self.rows.len()
            );
        }
        let slots: Vec<(usize, usize)> = self
            .samples
            .iter()
            .filter(|k| k.condition == 0)
            .map(|k| (k.timepoint, k.replicate))
            .collect();
        let mut out = HdxTable::new(self.conditions.clone(), self.timepoints.clone(), &slots)?;
        let n = self.samples.len();
        for (old, row) in self.rows.iter().enumerate() {
            if !keep[old] {
                continue;
            }
            let new = out.push_row(row.clone())?;
            for (f, matrix) in self.values.iter().enumerate() {
                out.values[f][new * n..(new + 1) * n]
                    .copy_from_slice(&matrix[old * n..(old + 1) * n]);
            }
            out.confidence[new * n..(new + 1) * n]
                .copy_from_slice(&self.confidence[old * n..(old + 1) * n]);
        }
        Ok(out)
    }

    pub fn sample_label(&self, column: usize) -> String {
        let k = self.samples[column];
        format!(
            "{}_{}_{}",
            self.conditions[k.condition],
            format_timepoint(self.timepoints[k.timepoint]),
            k.replicate + 1
        )
    }
}

pub fn format_timepoint(seconds: f64) -> String {
    if seconds.fract() == 0.0 {
        format!("{}", seconds as i64)
    } else {
        format!("{}", seconds)
    }
}
