use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "kira-hdxqc",
    version,
    about = "Quality control for HDX-MS peptide uptake exports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run every diagnostic and write the reports.
    Run(RunArgs),
    /// Parse and normalize an export, then print table counts.
    Validate(ValidateArgs),
    /// Score observed isotope envelopes against theoretical ones.
    Spectra(SpectraArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long, help = "Peptide export (.csv, .tsv, optionally .gz)")]
    pub input: PathBuf,

    #[arg(long)]
    pub out: PathBuf,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Condition names, one per export state in order of appearance"
    )]
    pub states: Option<Vec<String>>,

    #[arg(long, help = "Peak table for spectral similarity")]
    pub peaks: Option<PathBuf>,

    #[arg(long)]
    pub max_spectra: Option<usize>,

    #[arg(long, help = "JSON file overriding default thresholds and column names")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Missing-value count above which a peptide is flagged")]
    pub missing_threshold: Option<f64>,

    #[arg(long, default_value_t = false, help = "Keep peptides flagged as missing not at random")]
    pub no_filter: bool,

    #[arg(long, default_value_t = 0, help = "Number of threads (0 = auto)")]
    pub threads: usize,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long, default_value_t = false)]
    pub tsv: bool,

    #[arg(long, default_value_t = false, help = "Write plot data tables under <out>/plots")]
    pub plots: bool,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, value_delimiter = ',')]
    pub states: Option<Vec<String>>,

    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SpectraArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub peaks: PathBuf,

    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, value_delimiter = ',')]
    pub states: Option<Vec<String>>,

    #[arg(long)]
    pub max_spectra: Option<usize>,

    #[arg(long, help = "Peak matching tolerance in ppm")]
    pub ppm: Option<f64>,

    #[arg(long, help = "Write mirror plot data for the spectrum at this index")]
    pub mirror: Option<usize>,

    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = 0, help = "Number of threads (0 = auto)")]
    pub threads: usize,
}
