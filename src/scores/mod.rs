pub mod aggregate;
pub mod charge;
pub mod compatible;
pub mod drift;
pub mod intensity;
pub mod mass_error;
pub mod missingness;
pub mod monotonicity;
pub mod replicate;

/// Common output shape of the per-peptide diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierRecord {
    pub feature: String,
    pub statistic: Option<f64>,
    pub outlier: bool,
}

/// Per-peptide records of one condition.
#[derive(Debug, Clone)]
pub struct ConditionOutliers {
    pub condition: String,
    pub threshold: Option<f64>,
    pub records: Vec<OutlierRecord>,
}

impl ConditionOutliers {
    pub fn flagged(&self) -> impl Iterator<Item = &OutlierRecord> {
        self.records.iter().filter(|r| r.outlier)
    }

    /// Reference line for plots: the smallest flagged statistic.
    pub fn min_flagged(&self) -> Option<f64> {
        self.flagged()
            .filter_map(|r| r.statistic)
            .min_by(|a, b| a.total_cmp(b))
    }
}
