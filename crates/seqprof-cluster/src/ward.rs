//! Agglomerative clustering with Ward's criterion.
//!
//! Each step merges the closest pair of active clusters, then updates the
//! distance from the new cluster to every other one with the Lance–Williams
//! recurrence:
//!
//! ```text
//! d(k, i∪j) = ((n_i + n_k) d(k, i) + (n_j + n_k) d(k, j) - n_k d(i, j))
//!             / (n_i + n_j + n_k)
//! ```
//!
//! The merged cluster keeps the slot of its lower index, so a slot always
//! holds the cluster whose smallest subject index equals the slot. Scanning
//! pairs `(i, j)` with `i < j` and replacing the best only on a strictly
//! smaller cost resolves ties towards the lowest pair.

use std::time::Instant;

use tracing::{debug, info};

use seqprof_distance::DissimilarityMatrix;
use seqprof_model::{Linkage, ProfileError, Result, Stage};

use crate::dendrogram::{Dendrogram, MergeNode, NodeId};

/// Build the full merge tree (`n - 1` merges) for `dissimilarities`.
pub fn ward_clustering(
    dissimilarities: &DissimilarityMatrix,
    linkage: Linkage,
) -> Result<Dendrogram> {
    let n = dissimilarities.dim();
    if n == 0 {
        return Err(ProfileError::degenerate(Stage::Cluster, "no subjects to cluster"));
    }
    let started = Instant::now();

    // Ward-D2 runs the recurrence on squared dissimilarities.
    let mut distance: Vec<f64> = dissimilarities
        .matrix()
        .values()
        .iter()
        .map(|value| match linkage {
            Linkage::WardD => *value,
            Linkage::WardD2 => value * value,
        })
        .collect();
    let mut active = vec![true; n];
    let mut size = vec![1usize; n];
    let mut node: Vec<NodeId> = (0..n).collect();
    let mut merges = Vec::with_capacity(n.saturating_sub(1));

    for step in 0..n.saturating_sub(1) {
        let Some((i, j, cost)) = closest_pair(&distance, &active, n) else {
            return Err(ProfileError::data_integrity(
                Stage::Cluster,
                format!("no mergeable pair left after {step} merges"),
            ));
        };

        let (n_i, n_j) = (size[i] as f64, size[j] as f64);
        for k in (0..n).filter(|&k| active[k] && k != i && k != j) {
            let n_k = size[k] as f64;
            let updated = ((n_i + n_k) * distance[k * n + i] + (n_j + n_k) * distance[k * n + j]
                - n_k * cost)
                / (n_i + n_j + n_k);
            distance[k * n + i] = updated;
            distance[i * n + k] = updated;
        }

        let height = match linkage {
            Linkage::WardD => cost,
            Linkage::WardD2 => cost.max(0.0).sqrt(),
        };
        size[i] += size[j];
        active[j] = false;
        merges.push(MergeNode {
            left: node[i],
            right: node[j],
            height,
            size: size[i],
        });
        node[i] = n + step;
        debug!(step, left = i, right = j, height, size = size[i], "clusters merged");
    }

    info!(
        subject_count = n,
        linkage = linkage.as_str(),
        merges = merges.len(),
        duration_ms = started.elapsed().as_millis(),
        "ward clustering finished"
    );
    Ok(Dendrogram::new(n, merges, linkage))
}

fn closest_pair(distance: &[f64], active: &[bool], n: usize) -> Option<(usize, usize, f64)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for i in (0..n).filter(|&i| active[i]) {
        for j in ((i + 1)..n).filter(|&j| active[j]) {
            let cost = distance[i * n + j];
            if best.is_none_or(|(_, _, current)| cost < current) {
                best = Some((i, j, cost));
            }
        }
    }
    best
}
