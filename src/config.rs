use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::table::Field;

/// Header aliases for the vendor exports. Matching ignores case and any
/// non-alphanumeric character, so `% Deut` and `X..Deut` are the same key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub sequence: Vec<String>,
    pub charge: Vec<String>,
    pub state: Vec<String>,
    pub deut_time: Vec<String>,
    pub start: Vec<String>,
    pub end: Vec<String>,
    pub actual_rt: Vec<String>,
    pub ims_range: Vec<String>,
    pub uptake: Vec<String>,
    pub search_rt: Vec<String>,
    pub search_ims: Vec<String>,
    pub spectra: Vec<String>,
    pub max_intensity: Vec<String>,
    pub exp_centroid: Vec<String>,
    pub theor_centroid: Vec<String>,
    pub score: Vec<String>,
    pub confidence: Vec<String>,
    pub start_rt: Vec<String>,
    pub end_rt: Vec<String>,
    pub incorporation: Vec<String>,
    pub max_incorporation: Vec<String>,
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            sequence: names(&["Sequence"]),
            charge: names(&["Charge", "z"]),
            state: names(&["Protein State", "Protein.State", "State"]),
            deut_time: names(&["Deut Time", "Deut.Time", "Exposure"]),
            start: names(&["Start"]),
            end: names(&["End"]),
            actual_rt: names(&["Actual RT", "Actual.RT"]),
            ims_range: names(&["IMS Range", "IMS.Range"]),
            uptake: names(&["% Deut", "X..Deut", "Deut %", "Deut.."]),
            search_rt: names(&["Search RT", "Search.RT"]),
            search_ims: names(&["Search IMS", "Search.IMS"]),
            spectra: names(&["# Spectra", "X..Spectra"]),
            max_intensity: names(&["Max Inty", "Max.Inty"]),
            exp_centroid: names(&["Exp Cent", "Exp.Cent"]),
            theor_centroid: names(&["Theor Cent", "Theor.Cent"]),
            score: names(&["Score"]),
            confidence: names(&["Confidence"]),
            start_rt: names(&["Start RT", "Start.RT"]),
            end_rt: names(&["End RT", "End.RT"]),
            incorporation: names(&["#D", "X.D", "Incorporation"]),
            max_incorporation: names(&["Max #D", "Max.D", "maxD", "Max Incorporation"]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeScope {
    /// Only missing cells at timepoint zero.
    ZeroTimepoint,
    /// Every missing uptake cell left after filtering.
    All,
}

/// Window-bound fields for one drift diagnostic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DriftFields {
    pub left: Field,
    pub right: Field,
    pub search: Field,
}

impl DriftFields {
    pub fn retention() -> Self {
        Self {
            left: Field::LeftRt,
            right: Field::RightRt,
            search: Field::SearchRt,
        }
    }

    pub fn mobility() -> Self {
        Self {
            left: Field::LeftIms,
            right: Field::RightIms,
            search: Field::SearchIms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralConfig {
    pub ppm_tolerance: f64,
    pub max_spectra: Option<usize>,
    /// Zero-based column index of the base m/z in the peak table. Intensity
    /// columns follow it.
    pub base_mz_column: usize,
    pub similarity_min: f64,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            ppm_tolerance: 20.0,
            max_spectra: None,
            base_mz_column: 16,
            similarity_min: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QcConfig {
    pub columns: ColumnNames,
    pub missing_token: String,
    pub fd_token: String,
    pub missing_threshold: Option<f64>,
    pub filter_missing: bool,
    pub impute: ImputeScope,
    pub intensity_field: Field,
    pub retention: DriftFields,
    pub mobility: DriftFields,
    pub iqr_multiplier: f64,
    pub monotonicity_quantile: f64,
    pub replicate_variance_quantile: f64,
    pub replicate_skew_quantile: f64,
    pub overlap: usize,
    pub mass_error_ppm_tolerance: f64,
    pub charge_correlation_min: f64,
    pub spectral: SpectralConfig,
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            missing_token: "n/a".to_string(),
            fd_token: "FD".to_string(),
            missing_threshold: None,
            filter_missing: true,
            impute: ImputeScope::All,
            intensity_field: Field::MaxIntensity,
            retention: DriftFields::retention(),
            mobility: DriftFields::mobility(),
            iqr_multiplier: 1.5,
            monotonicity_quantile: 0.98,
            replicate_variance_quantile: 0.95,
            replicate_skew_quantile: 0.99,
            overlap: 5,
            mass_error_ppm_tolerance: 20.0,
            charge_correlation_min: 0.8,
            spectral: SpectralConfig::default(),
        }
    }
}

impl QcConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: QcConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, q) in [
            ("monotonicity_quantile", self.monotonicity_quantile),
            ("replicate_variance_quantile", self.replicate_variance_quantile),
            ("replicate_skew_quantile", self.replicate_skew_quantile),
        ] {
            if !(0.0..=1.0).contains(&q) {
                bail!("{} must be within [0, 1], got {}", name, q);
            }
        }
        if self.iqr_multiplier < 0.0 {
            bail!("iqr_multiplier must be non-negative");
        }
        if self.spectral.ppm_tolerance <= 0.0 {
            bail!("spectral ppm_tolerance must be positive");
        }
        if let Some(t) = self.missing_threshold {
            if t < 0.0 {
                bail!("missing_threshold must be non-negative");
            }
        }
        Ok(())
    }
}
