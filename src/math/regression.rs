//! Ordinary least squares with one predictor and its influence diagnostics.

use anyhow::{Result, bail};

use crate::math::stats::mean;

const PARAMS: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
    pub residuals: Vec<f64>,
    pub leverage: Vec<f64>,
}

pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LinearFit> {
    if x.len() != y.len() {
        bail!("regression inputs differ in length: {} != {}", x.len(), y.len());
    }
    let n = x.len();
    if n == 0 {
        bail!("regression requires at least one observation");
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        bail!("regression inputs must be finite");
    }

    let mx = mean(x).unwrap_or(0.0);
    let my = mean(y).unwrap_or(0.0);
    let sxx: f64 = x.iter().map(|v| (v - mx) * (v - mx)).sum();
    let sxy: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();

    // Constant predictor: intercept-only model.
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    let intercept = my - slope * mx;

    let residuals = x
        .iter()
        .zip(y)
        .map(|(a, b)| b - (intercept + slope * a))
        .collect();
    let leverage = x
        .iter()
        .map(|a| {
            let base = 1.0 / n as f64;
            if sxx > 0.0 {
                base + (a - mx) * (a - mx) / sxx
            } else {
                base
            }
        })
        .collect();

    Ok(LinearFit {
        intercept,
        slope,
        residuals,
        leverage,
    })
}

impl LinearFit {
    /// Cook's distance for every observation.
    ///
    /// A perfect fit, or one without residual degrees of freedom, has no
    /// influential points and yields zeros.
    pub fn cooks_distance(&self, y: &[f64]) -> Vec<f64> {
        let n = self.residuals.len();
        let sse: f64 = self.residuals.iter().map(|r| r * r).sum();
        let scale = y.iter().map(|v| v * v).sum::<f64>().max(1.0);
        if n as f64 <= PARAMS || sse <= 1e-20 * scale {
            return vec![0.0; n];
        }
        let mse = sse / (n as f64 - PARAMS);
        self.residuals
            .iter()
            .zip(&self.leverage)
            .map(|(r, h)| {
                let denom = 1.0 - h;
                if denom <= f64::EPSILON {
                    return 0.0;
                }
                (r * r) / (PARAMS * mse) * h / (denom * denom)
            })
            .collect()
    }
}
