//! Cosine similarity between centroided spectra with a relative m/z
//! tolerance.

#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub score: f64,
    pub matched_peaks: usize,
}

fn within_ppm(a: f64, b: f64, ppm: f64) -> Option<f64> {
    if b == 0.0 {
        return None;
    }
    let err = ((a - b) / b).abs() * 1e6;
    (err <= ppm).then_some(err)
}

/// Peaks are paired greedily, each query peak taking the closest unused
/// reference peak within `ppm`. Unmatched peaks contribute to the norms only.
pub fn cosine_similarity(
    query_mz: &[f64],
    query_intensity: &[f64],
    ref_mz: &[f64],
    ref_intensity: &[f64],
    ppm: f64,
) -> MatchResult {
    if query_mz.is_empty() || ref_mz.is_empty() {
        return MatchResult {
            score: 0.0,
            matched_peaks: 0,
        };
    }

    let mut ref_used = vec![false; ref_mz.len()];
    let mut dot = 0.0;
    let mut matched_peaks = 0;
    for (qi, &qmz) in query_mz.iter().enumerate() {
        let mut best: Option<(usize, f64)> = None;
        for (ri, &rmz) in ref_mz.iter().enumerate() {
            if ref_used[ri] {
                continue;
            }
            if let Some(err) = within_ppm(qmz, rmz, ppm) {
                if best.is_none_or(|(_, e)| err < e) {
                    best = Some((ri, err));
                }
            }
        }
        if let Some((ri, _)) = best {
            ref_used[ri] = true;
            dot += query_intensity[qi] * ref_intensity[ri];
            matched_peaks += 1;
        }
    }

    let norm_q: f64 = query_intensity.iter().map(|v| v * v).sum::<f64>().sqrt();
    let norm_r: f64 = ref_intensity.iter().map(|v| v * v).sum::<f64>().sqrt();
    let denom = norm_q * norm_r;
    let score = if denom > 0.0 { dot / denom } else { 0.0 };

    MatchResult {
        score,
        matched_peaks,
    }
}
