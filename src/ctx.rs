use std::path::PathBuf;

use crate::config::QcConfig;
use crate::input::{PeakRecord, RawRecord};
use crate::schema::v1::HdxQcV1;
use crate::scores::aggregate::SummaryTable;
use crate::scores::charge::ConditionChargeCorrelation;
use crate::scores::compatible::CompatibleResult;
use crate::scores::drift::DriftResult;
use crate::scores::intensity::IntensityResult;
use crate::scores::mass_error::MassErrorResult;
use crate::scores::missingness::MissingnessResult;
use crate::scores::{ConditionOutliers, OutlierRecord};
use crate::spectra::SpectralResult;
use crate::table::normalize::Normalized;
use crate::table::{Design, HdxTable};

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
    pub json_path: PathBuf,
    pub tsv_path: PathBuf,
    pub plots_dir: PathBuf,
    pub spectra_path: PathBuf,
}

impl OutputPaths {
    pub fn new(out_dir: PathBuf) -> Self {
        Self {
            json_path: out_dir.join("hdxqc.json"),
            tsv_path: out_dir.join("hdxqc_summary.tsv"),
            plots_dir: out_dir.join("plots"),
            spectra_path: out_dir.join("spectra.tsv"),
            out_dir,
        }
    }

    pub fn mirror_path(&self, index: usize) -> PathBuf {
        self.out_dir.join(format!("mirror_{}.tsv", index))
    }
}

#[derive(Debug)]
pub struct Ctx {
    pub input: PathBuf,
    pub peaks_path: Option<PathBuf>,
    pub states: Option<Vec<String>>,
    pub config: QcConfig,
    pub threads: usize,
    pub write_json: bool,
    pub write_tsv: bool,
    pub write_plots: bool,
    pub mirror: Option<usize>,
    pub output: OutputPaths,
    pub records: Vec<RawRecord>,
    pub peaks: Vec<PeakRecord>,
    pub normalized: Option<Normalized>,
    /// Table after missingness filtering and zero imputation; every
    /// downstream diagnostic reads this one.
    pub table: Option<HdxTable>,
    pub design: Option<Design>,
    pub missingness: Option<MissingnessResult>,
    pub imputed_cells: usize,
    pub mass_error: Option<MassErrorResult>,
    pub intensity: Option<IntensityResult>,
    pub retention: Option<DriftResult>,
    pub mobility: Option<DriftResult>,
    pub monotonicity: Option<Vec<ConditionOutliers>>,
    pub replicate_variance: Option<Vec<ConditionOutliers>>,
    pub replicate_skew: Option<Vec<ConditionOutliers>>,
    pub charge: Option<Vec<ConditionChargeCorrelation>>,
    pub charge_outliers: Option<Vec<OutlierRecord>>,
    pub compatible: Option<CompatibleResult>,
    pub spectral: Option<SpectralResult>,
    pub spectral_outliers: Option<Vec<OutlierRecord>>,
    pub summary: Option<SummaryTable>,
    pub warnings: Vec<String>,
    pub report: HdxQcV1,
}

impl Ctx {
    pub fn new(input: PathBuf, out_dir: PathBuf, config: QcConfig, tool_version: &str) -> Self {
        Self {
            input,
            peaks_path: None,
            states: None,
            config,
            threads: 0,
            write_json: false,
            write_tsv: false,
            write_plots: false,
            mirror: None,
            output: OutputPaths::new(out_dir),
            records: Vec::new(),
            peaks: Vec::new(),
            normalized: None,
            table: None,
            design: None,
            missingness: None,
            imputed_cells: 0,
            mass_error: None,
            intensity: None,
            retention: None,
            mobility: None,
            monotonicity: None,
            replicate_variance: None,
            replicate_skew: None,
            charge: None,
            charge_outliers: None,
            compatible: None,
            spectral: None,
            spectral_outliers: None,
            summary: None,
            warnings: Vec::new(),
            report: HdxQcV1::empty(tool_version),
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}
