//! Long-format tables behind each diagnostic plot.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::io::format_value;
use crate::scores::ConditionOutliers;
use crate::scores::charge::ConditionChargeCorrelation;
use crate::scores::drift::{DriftResult, ShiftRecord};
use crate::scores::intensity::IntensityResult;
use crate::scores::mass_error::MassErrorResult;
use crate::spectra::{SpectralPair, SpectralResult, mirror};

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn flag(outlier: bool) -> u8 {
    u8::from(outlier)
}

pub fn write_mass_error(path: &Path, result: &MassErrorResult) -> Result<()> {
    let mut w = create(path)?;
    writeln!(w, "feature\tsample\ttheoretical_mz\tppm_error")?;
    for p in &result.points {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            p.feature,
            p.sample,
            format_value(Some(p.theoretical)),
            format_value(Some(p.ppm))
        )?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_intensity(path: &Path, result: &IntensityResult) -> Result<()> {
    let mut w = create(path)?;
    writeln!(w, "feature\tlog_mean\tlog_variance\tcooks_distance\toutlier")?;
    for p in &result.points {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            p.feature,
            format_value(Some(p.log_mean)),
            format_value(Some(p.log_variance)),
            format_value(Some(p.cooks_distance)),
            flag(p.cooks_distance > result.threshold)
        )?;
    }
    w.flush()?;
    Ok(())
}

fn write_shift_rows(w: &mut impl Write, side: &str, records: &[ShiftRecord]) -> Result<()> {
    for r in records {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            side,
            r.feature,
            r.sequence,
            r.condition,
            r.sample,
            format_value(r.search),
            format_value(Some(r.shift)),
            flag(r.outlier)
        )?;
    }
    Ok(())
}

pub fn write_drift(path: &Path, result: &DriftResult) -> Result<()> {
    let mut w = create(path)?;
    writeln!(
        w,
        "side\tfeature\tsequence\tcondition\tsample\tsearch\tshift\toutlier"
    )?;
    write_shift_rows(&mut w, "left", &result.left)?;
    write_shift_rows(&mut w, "right", &result.right)?;
    w.flush()?;
    Ok(())
}

/// Per-condition statistics with the reference line at the smallest flagged
/// value.
pub fn write_condition_outliers(path: &Path, conditions: &[ConditionOutliers]) -> Result<()> {
    let mut w = create(path)?;
    writeln!(
        w,
        "condition\tfeature\tstatistic\tthreshold\tmin_flagged\toutlier"
    )?;
    for cond in conditions {
        let line = format_value(cond.min_flagged());
        let threshold = format_value(cond.threshold);
        for r in &cond.records {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t{}",
                cond.condition,
                r.feature,
                format_value(r.statistic),
                threshold,
                line,
                flag(r.outlier)
            )?;
        }
    }
    w.flush()?;
    Ok(())
}

pub fn write_charge_correlation(
    path: &Path,
    results: &[ConditionChargeCorrelation],
) -> Result<()> {
    let mut w = create(path)?;
    writeln!(w, "condition\tsequence\tcharge_a\tcharge_b\tcorrelation")?;
    for cond in results {
        for group in &cond.groups {
            for (a, ca) in group.charges.iter().enumerate() {
                for (b, cb) in group.charges.iter().enumerate().skip(a + 1) {
                    let (Some(ca), Some(cb)) = (ca, cb) else {
                        continue;
                    };
                    writeln!(
                        w,
                        "{}\t{}\t{}\t{}\t{}",
                        cond.condition,
                        group.sequence,
                        ca,
                        cb,
                        format_value(group.matrix[a][b])
                    )?;
                }
            }
        }
    }
    w.flush()?;
    Ok(())
}

/// One row per scored spectrum.
pub fn write_spectra(path: &Path, result: &SpectralResult) -> Result<()> {
    let mut w = create(path)?;
    writeln!(
        w,
        "index\tfeature\tsequence\tcharge\tcondition\ttimepoint\treplicate\trt\tincorporation\tpeaks\tscore"
    )?;
    for pair in &result.pairs {
        let o = &pair.observed;
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            o.index,
            o.feature,
            o.sequence,
            o.charge,
            o.condition,
            o.timepoint,
            o.replicate,
            format_value(o.rt),
            format_value(Some(o.incorporation)),
            o.mz.len(),
            format_value(Some(pair.score))
        )?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_mirror(path: &Path, pair: &SpectralPair) -> Result<()> {
    let mut w = create(path)?;
    writeln!(w, "mz\tintensity\tsource")?;
    for (mz, intensity, source) in mirror(pair) {
        writeln!(
            w,
            "{}\t{}\t{}",
            format_value(Some(mz)),
            format_value(Some(intensity)),
            source
        )?;
    }
    w.flush()?;
    Ok(())
}

/// Writes every plot table available in `ctx` under `dir`. Returns the
/// files written.
pub fn write_plot_data(dir: &Path, ctx: &Ctx) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let mut written = Vec::new();
    let mut emit = |name: &str, f: &dyn Fn(&Path) -> Result<()>| -> Result<()> {
        let path = dir.join(name);
        f(&path)?;
        written.push(path);
        Ok(())
    };

    if let Some(r) = &ctx.mass_error {
        emit("mass_error.tsv", &|p| write_mass_error(p, r))?;
    }
    if let Some(r) = &ctx.intensity {
        emit("intensity.tsv", &|p| write_intensity(p, r))?;
    }
    if let Some(r) = &ctx.retention {
        emit("rt_shifts.tsv", &|p| write_drift(p, r))?;
    }
    if let Some(r) = &ctx.mobility {
        emit("ims_shifts.tsv", &|p| write_drift(p, r))?;
    }
    if let Some(r) = &ctx.monotonicity {
        emit("monotonicity.tsv", &|p| write_condition_outliers(p, r))?;
    }
    if let Some(r) = &ctx.replicate_variance {
        emit("replicate_variance.tsv", &|p| write_condition_outliers(p, r))?;
    }
    if let Some(r) = &ctx.replicate_skew {
        emit("replicate_skew.tsv", &|p| write_condition_outliers(p, r))?;
    }
    if let Some(r) = &ctx.charge {
        emit("charge_correlation.tsv", &|p| write_charge_correlation(p, r))?;
    }
    if let Some(r) = &ctx.spectral {
        emit("spectral.tsv", &|p| write_spectra(p, r))?;
    }

    info!(dir = %dir.display(), files = written.len(), "plot_data_written");
    Ok(written)
}
