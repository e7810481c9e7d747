use crate::scores::OutlierRecord;
use crate::table::{Field, HdxTable};

#[derive(Debug, Clone)]
pub struct MassErrorPoint {
    pub feature: String,
    pub sample: String,
    pub theoretical: f64,
    pub ppm: f64,
}

#[derive(Debug, Clone)]
pub struct MassErrorResult {
    pub points: Vec<MassErrorPoint>,
    /// Maximum absolute ppm error per peptide.
    pub per_peptide: Vec<OutlierRecord>,
}

pub fn ppm_error(experimental: f64, theoretical: f64) -> Option<f64> {
    if theoretical == 0.0 {
        return None;
    }
    Some((experimental - theoretical) / theoretical * 1e6)
}

pub fn compute_mass_error(table: &HdxTable, tolerance_ppm: f64) -> MassErrorResult {
    let mut points = Vec::new();
    let mut per_peptide = Vec::with_capacity(table.n_rows());

    for (row, peptide) in table.rows().iter().enumerate() {
        let mut worst: Option<f64> = None;
        for column in 0..table.n_samples() {
            let (Some(exp), Some(theo)) = (
                table.get(row, Field::ExpCentroid, column),
                table.get(row, Field::TheorCentroid, column),
            ) else {
                continue;
            };
            let Some(ppm) = ppm_error(exp, theo) else {
                continue;
            };
            worst = Some(worst.map_or(ppm.abs(), |w: f64| w.max(ppm.abs())));
            points.push(MassErrorPoint {
                feature: peptide.feature.clone(),
                sample: table.sample_label(column),
                theoretical: theo,
                ppm,
            });
        }
        per_peptide.push(OutlierRecord {
            feature: peptide.feature.clone(),
            statistic: worst,
            outlier: worst.is_some_and(|w| w > tolerance_ppm),
        });
    }

    MassErrorResult {
        points,
        per_peptide,
    }
}
