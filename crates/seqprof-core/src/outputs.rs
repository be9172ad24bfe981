//! Writing a finished run to an output directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, info_span};

use seqprof_model::PipelineOptions;
use seqprof_report::{
    ArtifactRecord, ArtifactWriter, ClusterSummary, InputRecord, RunCounts, RunManifest,
    fingerprint_file,
};

use crate::pipeline::PipelineOutput;

#[derive(Debug, Clone)]
pub struct WrittenOutputs {
    pub artifacts: Vec<ArtifactRecord>,
    pub manifest: PathBuf,
}

/// Six core artifacts, the profile tables and `run.json`.
pub fn write_outputs(
    output_dir: &Path,
    output: &PipelineOutput,
    options: &PipelineOptions,
    input: Option<&Path>,
) -> Result<WrittenOutputs> {
    let span = info_span!("output", output_dir = %output_dir.display());
    let _guard = span.enter();

    let mut writer = ArtifactWriter::create(output_dir)?;
    writer.write_coded_table(&output.coded, &output.subject_ids)?;
    let alphabet = output.sequences.alphabet().labels();
    writer.write_matrix("transition_rates", "from", alphabet, output.rates.rates())?;
    writer.write_matrix("substitution_costs", "state", alphabet, output.costs.matrix())?;
    writer.write_matrix(
        "dissimilarity",
        "subject",
        &output.subject_ids,
        output.dissimilarities.matrix(),
    )?;
    writer.write_dendrogram(&output.dendrogram)?;
    writer.write_assignment(&output.subject_ids, &output.assignment, &output.silhouette)?;
    writer.write_state_distributions(&output.sequences, &output.distributions)?;
    if !output.profiles.is_empty() {
        writer.write_profiles(&output.profiles)?;
    }
    let artifacts = writer.into_records();

    let mut manifest = RunManifest::new(options.clone(), run_counts(output));
    if let Some(path) = input {
        manifest.input = Some(InputRecord {
            path: path.display().to_string(),
            sha256: fingerprint_file(path)
                .with_context(|| format!("fingerprint {}", path.display()))?,
        });
    }
    manifest.merge_heights = output.dendrogram.heights();
    manifest.average_silhouette = output.silhouette.average;
    manifest.clusters = cluster_summaries(output);
    manifest.artifacts = artifacts.clone();
    let manifest_path = manifest.write(output_dir)?;

    info!(
        artifacts = artifacts.len(),
        manifest = %manifest_path.display(),
        "outputs written"
    );
    Ok(WrittenOutputs {
        artifacts,
        manifest: manifest_path,
    })
}

pub fn run_counts(output: &PipelineOutput) -> RunCounts {
    RunCounts {
        subjects: output.sequences.len(),
        features: output.coded.features().len(),
        dropped_features: output
            .coded
            .dropped()
            .iter()
            .map(|dropped| dropped.name.clone())
            .collect(),
        alphabet_size: output.sequences.alphabet().len(),
        distinct_sequences: output.sequences.distinct_count(),
        low_support_states: output.rates.low_support().len(),
        triangle_violations: output.triangle_violations,
    }
}

pub fn cluster_summaries(output: &PipelineOutput) -> Vec<ClusterSummary> {
    output
        .assignment
        .sizes()
        .into_iter()
        .enumerate()
        .map(|(offset, size)| ClusterSummary {
            cluster: offset + 1,
            size,
            medoid: output
                .medoids
                .get(offset)
                .and_then(|&subject| output.subject_ids.get(subject))
                .cloned()
                .unwrap_or_default(),
            silhouette: output.silhouette.per_cluster[offset],
        })
        .collect()
}
