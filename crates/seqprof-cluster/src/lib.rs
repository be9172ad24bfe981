//! Ward hierarchical clustering of subjects.
//!
//! [`ward_clustering`] builds the complete merge tree from a dissimilarity
//! matrix; [`Dendrogram::cut`] turns it into `k` clusters. Partition
//! diagnostics live in [`quality`].

mod assignment;
mod dendrogram;
pub mod quality;
mod ward;

pub use assignment::ClusterAssignment;
pub use dendrogram::{Dendrogram, MergeNode, NodeId};
pub use quality::{Silhouette, medoids, silhouette};
pub use ward::ward_clustering;
