//! CSV artifacts of one run.
//!
//! Every file written through [`ArtifactWriter`] is fingerprinted with
//! SHA-256 so `run.json` can vouch for the exact bytes on disk.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::{Column, CsvWriter, SerWriter};
use serde::Serialize;
use sha2::Digest;
use tracing::debug;

use seqprof_cluster::{ClusterAssignment, Dendrogram, Silhouette};
use seqprof_model::SquareMatrix;
use seqprof_sequence::{CodedTable, SequenceSet};

use crate::distribution::ClusterStateDistribution;
use crate::profiler::VariableProfile;

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    hex::encode(digest)
}

pub fn fingerprint_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    Ok(sha256_hex(&bytes))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRecord {
    pub name: String,
    pub file: String,
    pub bytes: u64,
    pub sha256: String,
}

pub struct ArtifactWriter {
    dir: PathBuf,
    records: Vec<ArtifactRecord>,
}

impl ArtifactWriter {
    pub fn create(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            records: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn records(&self) -> &[ArtifactRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ArtifactRecord> {
        self.records
    }

    /// Coded feature table, one row per subject.
    pub fn write_coded_table(
        &mut self,
        table: &CodedTable,
        subject_ids: &[String],
    ) -> Result<PathBuf> {
        let path = self.dir.join("coded_table.csv");
        let mut frame = table.to_frame().context("build coded table frame")?;
        let ids: Vec<&str> = subject_ids.iter().map(String::as_str).collect();
        frame
            .insert_column(0, Column::new("subject".into(), ids))
            .context("add subject column")?;
        let mut file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut frame)
            .with_context(|| format!("write {}", path.display()))?;
        self.record("coded_table", &path)?;
        Ok(path)
    }

    /// Square matrix with row and column labels.
    pub fn write_matrix(
        &mut self,
        name: &str,
        corner: &str,
        labels: &[String],
        matrix: &SquareMatrix,
    ) -> Result<PathBuf> {
        let path = self.dir.join(format!("{name}.csv"));
        let mut writer = csv_writer(&path)?;
        let mut header = Vec::with_capacity(labels.len() + 1);
        header.push(corner.to_string());
        header.extend(labels.iter().cloned());
        writer.write_record(&header)?;
        for (label, row) in labels.iter().zip(matrix.rows()) {
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(label.clone());
            record.extend(row.iter().map(ToString::to_string));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        self.record(name, &path)?;
        Ok(path)
    }

    /// One line per merge. Ids below the subject count are subjects
    /// (0-based), larger ids refer to the merge on line `id - subjects`.
    pub fn write_dendrogram(&mut self, dendrogram: &Dendrogram) -> Result<PathBuf> {
        let path = self.dir.join("dendrogram.csv");
        let mut writer = csv_writer(&path)?;
        writer.write_record(["step", "node", "left", "right", "height", "size"])?;
        for (step, merge) in dendrogram.merges().iter().enumerate() {
            writer.write_record([
                (step + 1).to_string(),
                (dendrogram.leaves() + step).to_string(),
                merge.left.to_string(),
                merge.right.to_string(),
                merge.height.to_string(),
                merge.size.to_string(),
            ])?;
        }
        writer.flush()?;
        self.record("dendrogram", &path)?;
        Ok(path)
    }

    pub fn write_assignment(
        &mut self,
        subject_ids: &[String],
        assignment: &ClusterAssignment,
        silhouette: &Silhouette,
    ) -> Result<PathBuf> {
        let path = self.dir.join("assignment.csv");
        let mut writer = csv_writer(&path)?;
        writer.write_record(["subject", "cluster", "silhouette"])?;
        for ((id, label), width) in subject_ids
            .iter()
            .zip(assignment.labels())
            .zip(&silhouette.widths)
        {
            writer.write_record([id.clone(), label.to_string(), width.to_string()])?;
        }
        writer.flush()?;
        self.record("assignment", &path)?;
        Ok(path)
    }

    /// Contingency counts in long form; missing answers use an empty value.
    pub fn write_profiles(&mut self, profiles: &[VariableProfile]) -> Result<PathBuf> {
        let path = self.dir.join("profiles.csv");
        let mut writer = csv_writer(&path)?;
        writer.write_record(["variable", "cluster", "value", "count"])?;
        for profile in profiles {
            let table = &profile.table;
            for (offset, row) in table.counts.iter().enumerate() {
                let cluster = (offset + 1).to_string();
                for (value, count) in table.values.iter().zip(row) {
                    writer.write_record([
                        table.variable.as_str(),
                        cluster.as_str(),
                        value.as_str(),
                        count.to_string().as_str(),
                    ])?;
                }
                writer.write_record([
                    table.variable.as_str(),
                    cluster.as_str(),
                    "",
                    table.missing[offset].to_string().as_str(),
                ])?;
            }
        }
        writer.flush()?;
        self.record("profiles", &path)?;
        Ok(path)
    }

    pub fn write_state_distributions(
        &mut self,
        set: &SequenceSet,
        distributions: &[ClusterStateDistribution],
    ) -> Result<PathBuf> {
        let path = self.dir.join("state_distribution.csv");
        let mut writer = csv_writer(&path)?;
        writer.write_record(["cluster", "position", "feature", "state", "share"])?;
        let labels = set.alphabet().labels();
        for distribution in distributions {
            for (position, shares) in distribution.shares.iter().enumerate() {
                let feature = set
                    .feature_names()
                    .get(position)
                    .map_or("", String::as_str);
                for (label, share) in labels.iter().zip(shares) {
                    writer.write_record([
                        distribution.cluster.to_string(),
                        (position + 1).to_string(),
                        feature.to_string(),
                        label.clone(),
                        share.to_string(),
                    ])?;
                }
            }
        }
        writer.flush()?;
        self.record("state_distribution", &path)?;
        Ok(path)
    }

    fn record(&mut self, name: &str, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let file = path
            .file_name()
            .map(|file| file.to_string_lossy().into_owned())
            .unwrap_or_default();
        let record = ArtifactRecord {
            name: name.to_string(),
            file,
            bytes: bytes.len() as u64,
            sha256: sha256_hex(&bytes),
        };
        debug!(
            artifact = %record.file,
            bytes = record.bytes,
            sha256 = %record.sha256,
            "artifact written"
        );
        self.records.push(record);
        Ok(())
    }
}

fn csv_writer(path: &Path) -> Result<csv::Writer<File>> {
    csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqprof_model::Stage;

    #[test]
    fn matrix_csv_is_labelled_and_fingerprinted() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ArtifactWriter::create(&dir.path().join("out")).unwrap();
        let matrix =
            SquareMatrix::from_rows(Stage::Substitution, vec![vec![0.0, 1.5], vec![1.5, 0.0]])
                .unwrap();
        let path = writer
            .write_matrix(
                "substitution_costs",
                "state",
                &["No".to_string(), "Yes".to_string()],
                &matrix,
            )
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "state,No,Yes\nNo,0,1.5\nYes,1.5,0\n");
        let record = &writer.records()[0];
        assert_eq!(record.file, "substitution_costs.csv");
        assert_eq!(record.sha256, sha256_hex(text.as_bytes()));
        assert_eq!(record.bytes, text.len() as u64);
    }

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
