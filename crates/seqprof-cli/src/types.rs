use std::path::PathBuf;

use seqprof_report::{ClusterSummary, RunCounts, VariableProfile};

#[derive(Debug)]
pub struct RunResult {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub manifest: PathBuf,
    pub counts: RunCounts,
    pub clusters: Vec<ClusterSummary>,
    pub average_silhouette: f64,
    pub profiles: Vec<VariableProfile>,
    pub artifact_count: usize,
}

/// One schema column as the encoder will treat it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRow {
    pub name: String,
    pub kind: String,
    pub in_table: bool,
    pub distinct: usize,
    pub missing: usize,
    pub decision: FeatureDecision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureDecision {
    Encoded,
    DroppedMissing,
    Absent,
    NotSequenced,
}

impl FeatureDecision {
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureDecision::Encoded => "encoded",
            FeatureDecision::DroppedMissing => "dropped (missing)",
            FeatureDecision::Absent => "absent",
            FeatureDecision::NotSequenced => "not sequenced",
        }
    }
}

#[derive(Debug)]
pub struct SchemaReport {
    pub input: PathBuf,
    pub subjects: usize,
    pub features: Vec<FeatureRow>,
    /// Table columns the schema does not mention.
    pub undeclared: Vec<String>,
}

#[derive(Debug)]
pub struct CostReport {
    pub labels: Vec<String>,
    pub costs: Vec<Vec<f64>>,
    pub low_support: Vec<String>,
    pub metric: bool,
}
