use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputMeta {
    pub export_rows: Option<u64>,
    pub peptides: Option<u64>,
    pub sequences: Option<u64>,
    pub conditions: Vec<String>,
    /// Distinct deuteration times in seconds.
    pub timepoints: Vec<f64>,
    pub replicates: Option<u64>,
    pub fd_rows: Option<u64>,
    pub removed_missing: Option<u64>,
    pub imputed_cells: Option<u64>,
}

/// Threshold of a diagnostic judged separately per condition. `min_flagged`
/// is the reference line drawn in its plot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionThreshold {
    pub condition: String,
    pub threshold: Option<f64>,
    pub min_flagged: Option<f64>,
    pub flagged: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub name: String,
    pub flagged: u64,
    pub threshold: Option<f64>,
    pub flagged_features: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionThreshold>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectraSummary {
    pub scored: u64,
    pub skipped: u64,
    pub min_score: Option<f64>,
    pub mean_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HdxQcV1 {
    pub tool: String,
    pub version: String,
    pub schema_version: String,
    pub input_meta: InputMeta,
    pub diagnostics: Vec<Diagnostic>,
    pub spectra: Option<SpectraSummary>,
    pub summary_tsv_path: Option<String>,
    pub warnings: Vec<String>,
}

impl HdxQcV1 {
    pub fn empty(tool_version: &str) -> Self {
        Self {
            tool: "kira-hdxqc".to_string(),
            version: tool_version.to_string(),
            schema_version: "v1".to_string(),
            input_meta: InputMeta::default(),
            diagnostics: Vec::new(),
            spectra: None,
            summary_tsv_path: None,
            warnings: Vec::new(),
        }
    }
}
