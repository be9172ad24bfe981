//! Cluster profiles and run artifacts.
//!
//! - **Profiles**: contingency tables and χ² association between clusters
//!   and study variables
//! - **State distributions**: per-cluster state shares at every position
//! - **Artifacts**: fingerprinted CSV files plus the `run.json` manifest

mod artifacts;
mod distribution;
mod manifest;
mod profiler;

pub use artifacts::{ArtifactRecord, ArtifactWriter, fingerprint_file, sha256_hex};
pub use distribution::{ClusterStateDistribution, state_distributions};
pub use manifest::{ClusterSummary, InputRecord, MANIFEST_FILE, RunCounts, RunManifest};
pub use profiler::{Association, ClusterProfiler, ContingencyTable, VariableProfile, chi_square};
