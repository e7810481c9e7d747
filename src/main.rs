use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use kira_hdxqc::cli::{Cli, Commands, RunArgs, SpectraArgs, ValidateArgs};
use kira_hdxqc::config::QcConfig;
use kira_hdxqc::ctx::Ctx;
use kira_hdxqc::io;
use kira_hdxqc::pipeline::Pipeline;
use kira_hdxqc::pipeline::full_run;
use kira_hdxqc::pipeline::stage0_scaffold::Stage0Scaffold;
use kira_hdxqc::pipeline::stage1_input::Stage1Input;
use kira_hdxqc::pipeline::stage2_normalize::Stage2Normalize;
use kira_hdxqc::pipeline::stage10_spectra::Stage10Spectra;
use kira_hdxqc::table::format_timepoint;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Validate(args) => validate(args),
        Commands::Spectra(args) => spectra(args),
    }
}

fn load_config(path: Option<&Path>) -> Result<QcConfig> {
    match path {
        Some(path) => QcConfig::load(path),
        None => Ok(QcConfig::default()),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if args.missing_threshold.is_some() {
        config.missing_threshold = args.missing_threshold;
    }
    if args.no_filter {
        config.filter_missing = false;
    }
    if args.max_spectra.is_some() {
        config.spectral.max_spectra = args.max_spectra;
    }

    let mut ctx = Ctx::new(args.input, args.out, config, env!("CARGO_PKG_VERSION"));
    ctx.states = args.states;
    ctx.peaks_path = args.peaks;
    ctx.threads = args.threads;
    ctx.write_json = args.json;
    ctx.write_tsv = args.tsv;
    ctx.write_plots = args.plots;

    full_run().run(&mut ctx)?;
    print_summary(&ctx)
}

fn validate(args: ValidateArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut ctx = Ctx::new(
        args.input,
        PathBuf::from("."),
        config,
        env!("CARGO_PKG_VERSION"),
    );
    ctx.states = args.states;

    let pipeline = Pipeline::new(vec![
        Box::new(Stage1Input::new()),
        Box::new(Stage2Normalize::new()),
    ]);
    pipeline.run(&mut ctx)?;

    print_validate_summary(&ctx)
}

fn spectra(args: SpectraArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if args.max_spectra.is_some() {
        config.spectral.max_spectra = args.max_spectra;
    }
    if let Some(ppm) = args.ppm {
        config.spectral.ppm_tolerance = ppm;
    }

    let mut ctx = Ctx::new(args.input, args.out, config, env!("CARGO_PKG_VERSION"));
    ctx.states = args.states;
    ctx.peaks_path = Some(args.peaks);
    ctx.threads = args.threads;
    ctx.mirror = args.mirror;

    let pipeline = Pipeline::new(vec![
        Box::new(Stage0Scaffold::new()),
        Box::new(Stage1Input::new()),
        Box::new(Stage2Normalize::new()),
        Box::new(Stage10Spectra::new()),
    ]);
    pipeline.run(&mut ctx)?;

    let result = ctx.spectral.as_ref().context("spectral result missing")?;
    io::plots::write_spectra(&ctx.output.spectra_path, result)?;
    if let Some(index) = ctx.mirror {
        let Some(pair) = result.pairs.get(index) else {
            bail!(
                "--mirror {} out of range: {} spectra scored",
                index,
                result.pairs.len()
            );
        };
        io::plots::write_mirror(&ctx.output.mirror_path(index), pair)?;
    }

    println!("kira-hdxqc spectra");
    println!("scored: {}", result.pairs.len());
    println!("skipped: {}", result.skipped);
    if let Some(min) = result
        .pairs
        .iter()
        .map(|p| p.score)
        .min_by(|a, b| a.total_cmp(b))
    {
        println!("min score: {:.4}", min);
    }
    Ok(())
}

fn print_summary(ctx: &Ctx) -> Result<()> {
    let summary = io::summary::format_summary(ctx)?;
    print!("{}", summary);
    if !ctx.warnings.is_empty() {
        println!("warnings:");
        for warning in &ctx.warnings {
            println!("- {}", warning);
        }
    }
    Ok(())
}

fn print_validate_summary(ctx: &Ctx) -> Result<()> {
    let normalized = ctx.normalized.as_ref().context("normalized table missing")?;
    let table = &normalized.table;
    let timepoints: Vec<String> = table
        .timepoints()
        .iter()
        .map(|t| format_timepoint(*t))
        .collect();
    println!("kira-hdxqc validate ok");
    println!("rows: {}", ctx.records.len());
    println!("peptides: {}", table.n_rows());
    println!("conditions: {}", table.conditions().join(","));
    println!("timepoints: {}", timepoints.join(","));
    println!("samples: {}", table.n_samples());
    println!("fd rows: {}", normalized.fd_rows.len());
    if !ctx.warnings.is_empty() {
        println!("warnings:");
        for warning in &ctx.warnings {
            println!("- {}", warning);
        }
    }
    Ok(())
}
