use kira_hdxqc::config::{QcConfig, SpectralConfig};
use kira_hdxqc::input::{PeakRecord, RawRecord};
use kira_hdxqc::spectra::isotopes::{NEUTRON, peptide_composition, theoretical_envelope};
use kira_hdxqc::spectra::similarity::cosine_similarity;
use kira_hdxqc::spectra::{mirror, observed_spectra, spectral_outliers, spectral_similarity};
use kira_hdxqc::table::normalize::{Normalized, normalize};

fn export() -> Vec<RawRecord> {
    (0..2)
        .map(|i| RawRecord {
            line: i + 2,
            sequence: "PEPTIDE".to_string(),
            charge: "2".to_string(),
            state: "A".to_string(),
            deut_time: "30".to_string(),
            uptake: Some("10".to_string()),
            ..Default::default()
        })
        .collect()
}

fn normalized(records: &[RawRecord]) -> Normalized {
    normalize(records, None, &QcConfig::default()).unwrap()
}

fn peak(line: u64, base_mz: f64, intensities: &[f64]) -> PeakRecord {
    PeakRecord {
        line,
        state: "A".to_string(),
        deut_time: Some("30".to_string()),
        start_rt: Some("4.0".to_string()),
        end_rt: Some("5.0".to_string()),
        charge: Some("2".to_string()),
        incorporation: Some("0".to_string()),
        max_incorporation: Some("5".to_string()),
        base_mz: format!("{}", base_mz),
        intensities: intensities.iter().map(|v| v.to_string()).collect(),
    }
}

#[test]
fn composition_and_monoisotopic_mass() {
    let comp = peptide_composition("PEPTIDE").unwrap();
    assert_eq!((comp.c, comp.h, comp.n, comp.o, comp.s), (34, 53, 7, 15, 0));
    assert!((comp.monoisotopic() - 799.359_964).abs() < 1e-3);
    assert!(peptide_composition("PEPXIDE").is_err());
}

#[test]
fn envelope_spacing_and_deuterium_shift() {
    let env = theoretical_envelope("PEPTIDE", 2, 0.0, 5).unwrap();
    assert!((env.mz[0] - 400.687_258).abs() < 1e-3);
    assert!((env.mz[1] - env.mz[0] - NEUTRON / 2.0).abs() < 1e-9);
    assert_eq!(env.intensity[0], 1.0);

    // Fully deuterated: all five exchangeable amides carry deuterium.
    let heavy = theoretical_envelope("PEPTIDE", 2, 1.0, 8).unwrap();
    let apex = heavy
        .intensity
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap();
    assert_eq!(apex, 5);
    assert!(theoretical_envelope("PEPTIDE", 0, 0.0, 5).is_err());
}

#[test]
fn cosine_similarity_respects_ppm_tolerance() {
    let mz = [500.0, 500.5, 501.0];
    let int = [1.0, 0.5, 0.25];
    let same = cosine_similarity(&mz, &int, &mz, &int, 20.0);
    assert!((same.score - 1.0).abs() < 1e-12);
    assert_eq!(same.matched_peaks, 3);

    // 10 ppm away.
    let shifted: Vec<f64> = mz.iter().map(|m| m * (1.0 + 10e-6)).collect();
    assert_eq!(cosine_similarity(&mz, &int, &shifted, &int, 20.0).matched_peaks, 3);
    let miss = cosine_similarity(&mz, &int, &shifted, &int, 5.0);
    assert_eq!(miss.matched_peaks, 0);
    assert_eq!(miss.score, 0.0);
    assert_eq!(cosine_similarity(&[], &[], &mz, &int, 20.0).score, 0.0);
}

#[test]
fn observed_spectra_require_matching_row_counts() {
    let records = export();
    let n = normalized(&records);
    let peaks = vec![peak(2, 400.0, &[1.0, 0.5])];
    let err = observed_spectra(&peaks, &records, &n, &SpectralConfig::default(), "n/a")
        .unwrap_err();
    assert!(err.to_string().contains("matched by position"));
}

#[test]
fn matching_envelope_scores_high_and_order_is_kept() {
    let records = export();
    let n = normalized(&records);
    let env = theoretical_envelope("PEPTIDE", 2, 0.0, 5).unwrap();
    let reversed: Vec<f64> = env.intensity.iter().rev().copied().collect();
    let peaks = vec![
        peak(2, env.mz[0], &env.intensity),
        peak(3, env.mz[0], &reversed),
    ];

    let result =
        spectral_similarity(&peaks, &records, &n, &SpectralConfig::default(), "n/a", 2).unwrap();
    assert_eq!(result.pairs.len(), 2);
    assert_eq!(result.skipped, 0);

    let first = &result.pairs[0];
    assert_eq!(first.observed.index, 0);
    assert_eq!(first.observed.replicate, 1);
    assert_eq!(first.observed.condition, "A");
    assert_eq!(first.observed.rt, Some(4.5));
    assert!(first.score > 0.99);

    let second = &result.pairs[1];
    assert_eq!(second.observed.index, 1);
    assert_eq!(second.observed.replicate, 2);
    assert!(second.score < 0.8);

    let outliers = spectral_outliers(&n.table, &result, 0.8);
    assert_eq!(outliers.len(), 1);
    assert_eq!(outliers[0].feature, "PEPTIDE2");
    assert!(outliers[0].outlier);

    let rows = mirror(first);
    assert_eq!(rows.len(), 10);
    assert!(rows[5..].iter().all(|(_, i, src)| *i <= 0.0 && *src == "theoretical"));
}

#[test]
fn max_spectra_caps_and_empty_peaks_are_skipped() {
    let records = export();
    let n = normalized(&records);
    let peaks = vec![peak(2, 400.0, &[0.0, 0.0]), peak(3, 400.0, &[1.0, 0.2])];

    let all = spectral_similarity(&peaks, &records, &n, &SpectralConfig::default(), "n/a", 1)
        .unwrap();
    assert_eq!(all.pairs.len(), 1);
    assert_eq!(all.skipped, 1);

    let cfg = SpectralConfig {
        max_spectra: Some(1),
        ..SpectralConfig::default()
    };
    let capped = spectral_similarity(&peaks, &records, &n, &cfg, "n/a", 1).unwrap();
    assert!(capped.pairs.is_empty());
    assert_eq!(capped.skipped, 1);
}

#[test]
fn fractional_or_negative_peak_charge_is_rejected() {
    let records = export();
    let n = normalized(&records);
    for bad in ["2.5", "-2"] {
        let mut peaks = vec![peak(2, 400.0, &[1.0, 0.5]), peak(3, 400.0, &[1.0, 0.5])];
        peaks[1].charge = Some(bad.to_string());
        let err = observed_spectra(&peaks, &records, &n, &SpectralConfig::default(), "n/a")
            .unwrap_err();
        assert!(err.to_string().contains("not a positive integer"), "{}", bad);
    }
}
