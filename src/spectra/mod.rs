//! Observed versus theoretical isotope envelopes.

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

#[cfg(feature = "mt")]
use rayon::prelude::*;

use crate::config::SpectralConfig;
use crate::input::{PeakRecord, RawRecord};
use crate::scores::OutlierRecord;
use crate::table::HdxTable;
use crate::table::normalize::{Normalized, parse_number};

pub mod isotopes;
pub mod similarity;

use isotopes::{Envelope, NEUTRON, normalize_max, theoretical_envelope};
use similarity::cosine_similarity;

#[derive(Debug, Clone)]
pub struct ObservedSpectrum {
    /// Row of the peak table this spectrum came from.
    pub index: usize,
    pub sequence: String,
    pub charge: u32,
    pub feature: String,
    pub condition: String,
    pub timepoint: String,
    pub replicate: usize,
    pub rt: Option<f64>,
    pub incorporation: f64,
    pub mz: Vec<f64>,
    pub intensity: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct SpectralPair {
    pub observed: ObservedSpectrum,
    pub theoretical: Envelope,
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SpectralResult {
    pub pairs: Vec<SpectralPair>,
    pub skipped: usize,
}

/// Builds observed spectra from the peak table. Rows are matched to the
/// export rows by position to recover sequence and charge.
pub fn observed_spectra(
    peaks: &[PeakRecord],
    export: &[RawRecord],
    normalized: &Normalized,
    cfg: &SpectralConfig,
    missing_token: &str,
) -> Result<(Vec<ObservedSpectrum>, usize)> {
    if peaks.len() != export.len() {
        bail!(
            "peak table has {} rows but the export has {}; rows are matched by position",
            peaks.len(),
            export.len()
        );
    }

    let limit = cfg.max_spectra.unwrap_or(peaks.len()).min(peaks.len());
    let mut spectra = Vec::with_capacity(limit);
    let mut replicates: HashMap<(String, String, String, u32), usize> = HashMap::new();
    let mut skipped = 0usize;

    for (index, (peak, rec)) in peaks.iter().zip(export).take(limit).enumerate() {
        let ctx = |name: &str| format!("peak table line {}: invalid {}", peak.line, name);
        let charge = match parse_number(peak.charge.as_deref(), missing_token)
            .with_context(|| ctx("charge"))?
        {
            Some(z) if z > 0.0 && z.fract() == 0.0 && z <= u32::MAX as f64 => z as u32,
            Some(z) => bail!(
                "peak table line {}: charge {} is not a positive integer",
                peak.line,
                z
            ),
            None => rec
                .charge
                .trim()
                .parse()
                .with_context(|| format!("line {}: invalid charge", rec.line))?,
        };
        let Some(base) =
            parse_number(Some(peak.base_mz.as_str()), missing_token).with_context(|| ctx("base m/z"))?
        else {
            skipped += 1;
            continue;
        };
        if charge == 0 {
            skipped += 1;
            continue;
        }

        let intensity = peak
            .intensities
            .iter()
            .map(|v| parse_number(Some(v.as_str()), missing_token).map(|v| v.unwrap_or(0.0)))
            .collect::<Result<Vec<f64>>>()
            .with_context(|| ctx("peak intensity"))?;
        if intensity.iter().all(|v| *v <= 0.0) {
            skipped += 1;
            continue;
        }
        let z = charge as f64;
        let mz = (0..intensity.len())
            .map(|k| base + k as f64 * NEUTRON / z)
            .collect();

        let rt = match (
            parse_number(peak.start_rt.as_deref(), missing_token).with_context(|| ctx("Start RT"))?,
            parse_number(peak.end_rt.as_deref(), missing_token).with_context(|| ctx("End RT"))?,
        ) {
            (Some(a), Some(b)) => Some((a + b) / 2.0),
            _ => None,
        };

        let observed = parse_number(peak.incorporation.as_deref(), missing_token)
            .with_context(|| ctx("incorporation"))?;
        let maximum = parse_number(peak.max_incorporation.as_deref(), missing_token)
            .with_context(|| ctx("maximum incorporation"))?;
        let incorporation = match (observed, maximum) {
            (Some(o), Some(m)) if m > 0.0 => (o / m).max(0.0),
            _ => 0.0,
        };

        let sequence = rec.sequence.trim().to_string();
        let condition = normalized
            .label_for(&peak.state)
            .unwrap_or(peak.state.as_str())
            .to_string();
        let timepoint = peak
            .deut_time
            .clone()
            .unwrap_or_else(|| rec.deut_time.clone());
        let counter = replicates
            .entry((
                condition.clone(),
                timepoint.clone(),
                sequence.clone(),
                charge,
            ))
            .or_insert(0);
        *counter += 1;

        spectra.push(ObservedSpectrum {
            index,
            feature: format!("{}{}", sequence, charge),
            sequence,
            charge,
            condition,
            timepoint,
            replicate: *counter,
            rt,
            incorporation,
            mz,
            intensity,
        });
    }

    let global_max = spectra
        .iter()
        .flat_map(|s| s.intensity.iter().copied())
        .fold(0.0f64, f64::max);
    if global_max > 0.0 {
        for s in &mut spectra {
            s.intensity.iter_mut().for_each(|v| *v /= global_max);
        }
    }

    if skipped > 0 {
        warn!(skipped, "peak rows without usable peaks skipped");
    }
    Ok((spectra, skipped))
}

fn score_one(observed: &ObservedSpectrum, ppm: f64) -> Result<SpectralPair> {
    let mut theoretical = theoretical_envelope(
        &observed.sequence,
        observed.charge,
        observed.incorporation,
        observed.mz.len(),
    )?;
    normalize_max(&mut theoretical.intensity);
    let score = cosine_similarity(
        &observed.mz,
        &observed.intensity,
        &theoretical.mz,
        &theoretical.intensity,
        ppm,
    )
    .score;
    Ok(SpectralPair {
        observed: observed.clone(),
        theoretical,
        score,
    })
}

/// Scores every observed spectrum against its theoretical envelope. Pairs
/// are independent; results keep the input order.
pub fn score_spectra(
    spectra: &[ObservedSpectrum],
    ppm: f64,
    threads: usize,
) -> Result<Vec<SpectralPair>> {
    #[cfg(feature = "mt")]
    let pairs = {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if threads > 0 {
            builder = builder.num_threads(threads);
        }
        let pool = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build thread pool: {}", e))?;
        pool.install(|| {
            spectra
                .par_iter()
                .map(|s| score_one(s, ppm))
                .collect::<Result<Vec<_>>>()
        })?
    };

    #[cfg(not(feature = "mt"))]
    let pairs = {
        let _ = threads;
        spectra
            .iter()
            .map(|s| score_one(s, ppm))
            .collect::<Result<Vec<_>>>()?
    };

    Ok(pairs)
}

pub fn spectral_similarity(
    peaks: &[PeakRecord],
    export: &[RawRecord],
    normalized: &Normalized,
    cfg: &SpectralConfig,
    missing_token: &str,
    threads: usize,
) -> Result<SpectralResult> {
    let (spectra, skipped) = observed_spectra(peaks, export, normalized, cfg, missing_token)?;
    let pairs = score_spectra(&spectra, cfg.ppm_tolerance, threads)?;
    info!(scored = pairs.len(), skipped, "spectra_scored");
    Ok(SpectralResult { pairs, skipped })
}

/// Lowest similarity per peptide of `table`; peptides without spectra have
/// no statistic.
pub fn spectral_outliers(
    table: &HdxTable,
    result: &SpectralResult,
    similarity_min: f64,
) -> Vec<OutlierRecord> {
    let mut lowest: HashMap<&str, f64> = HashMap::new();
    for pair in &result.pairs {
        let entry = lowest
            .entry(pair.observed.feature.as_str())
            .or_insert(pair.score);
        *entry = entry.min(pair.score);
    }
    table
        .rows()
        .iter()
        .map(|row| {
            let stat = lowest.get(row.feature.as_str()).copied();
            OutlierRecord {
                feature: row.feature.clone(),
                statistic: stat,
                outlier: stat.is_some_and(|s| s < similarity_min),
            }
        })
        .collect()
}

/// Mirror plot rows: observed peaks upward, theoretical peaks downward.
pub fn mirror(pair: &SpectralPair) -> Vec<(f64, f64, &'static str)> {
    let observed = pair
        .observed
        .mz
        .iter()
        .zip(&pair.observed.intensity)
        .map(|(mz, i)| (*mz, *i, "observed"));
    let theoretical = pair
        .theoretical
        .mz
        .iter()
        .zip(&pair.theoretical.intensity)
        .map(|(mz, i)| (*mz, -*i, "theoretical"));
    observed.chain(theoretical).collect()
}
