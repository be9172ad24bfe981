//! `run.json`: what was run, on what, and what came out.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use seqprof_model::PipelineOptions;

use crate::artifacts::ArtifactRecord;

pub const MANIFEST_FILE: &str = "run.json";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputRecord {
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunCounts {
    pub subjects: usize,
    pub features: usize,
    pub dropped_features: Vec<String>,
    pub alphabet_size: usize,
    pub distinct_sequences: usize,
    pub low_support_states: usize,
    pub triangle_violations: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub cluster: usize,
    pub size: usize,
    pub medoid: String,
    pub silhouette: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunManifest {
    pub tool: String,
    pub version: String,
    pub created_at: String,
    pub input: Option<InputRecord>,
    pub options: PipelineOptions,
    pub counts: RunCounts,
    pub merge_heights: Vec<f64>,
    pub average_silhouette: f64,
    pub clusters: Vec<ClusterSummary>,
    pub artifacts: Vec<ArtifactRecord>,
}

impl RunManifest {
    /// Stamped with the current UTC time.
    pub fn new(options: PipelineOptions, counts: RunCounts) -> Self {
        Self {
            tool: "seqprof".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            input: None,
            options,
            counts,
            merge_heights: Vec::new(),
            average_silhouette: 0.0,
            clusters: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).context("serialize run manifest")?;
        std::fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}
