//! Partition diagnostics computed from the dissimilarities alone.

use serde::Serialize;

use seqprof_distance::DissimilarityMatrix;
use seqprof_model::{ProfileError, Result, Stage};

use crate::assignment::ClusterAssignment;

/// Silhouette widths in `[-1, 1]`.
///
/// Subjects in singleton clusters, and every subject when `k == 1`, get a
/// width of 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Silhouette {
    pub widths: Vec<f64>,
    /// Mean width per cluster; index 0 is cluster 1.
    pub per_cluster: Vec<f64>,
    pub average: f64,
}

pub fn silhouette(
    dissimilarities: &DissimilarityMatrix,
    assignment: &ClusterAssignment,
) -> Result<Silhouette> {
    ensure_same_subjects(dissimilarities, assignment)?;
    let n = assignment.subject_count();
    let k = assignment.k();
    let sizes = assignment.sizes();
    let labels = assignment.labels();

    let mut widths = Vec::with_capacity(n);
    let mut sums = vec![0.0; k];
    for subject in 0..n {
        let own = labels[subject] - 1;
        let mut totals = vec![0.0; k];
        for other in (0..n).filter(|&other| other != subject) {
            totals[labels[other] - 1] += dissimilarities.get(subject, other);
        }
        let width = if k == 1 || sizes[own] == 1 {
            0.0
        } else {
            let within = totals[own] / (sizes[own] - 1) as f64;
            let nearest = (0..k)
                .filter(|&cluster| cluster != own)
                .map(|cluster| totals[cluster] / sizes[cluster] as f64)
                .fold(f64::INFINITY, f64::min);
            let scale = within.max(nearest);
            if scale > 0.0 {
                (nearest - within) / scale
            } else {
                0.0
            }
        };
        sums[own] += width;
        widths.push(width);
    }

    let per_cluster = sums
        .iter()
        .zip(&sizes)
        .map(|(sum, size)| sum / *size as f64)
        .collect();
    let average = if n == 0 {
        0.0
    } else {
        widths.iter().sum::<f64>() / n as f64
    };
    Ok(Silhouette {
        widths,
        per_cluster,
        average,
    })
}

/// Most central subject of every cluster: the member with the smallest sum
/// of dissimilarities to the other members, lowest index on ties.
pub fn medoids(
    dissimilarities: &DissimilarityMatrix,
    assignment: &ClusterAssignment,
) -> Result<Vec<usize>> {
    ensure_same_subjects(dissimilarities, assignment)?;
    let mut medoids = Vec::with_capacity(assignment.k());
    for cluster in 1..=assignment.k() {
        let members = assignment.members(cluster);
        let mut best: Option<(usize, f64)> = None;
        for &candidate in &members {
            let total: f64 = members
                .iter()
                .map(|&other| dissimilarities.get(candidate, other))
                .sum();
            if best.is_none_or(|(_, current)| total < current) {
                best = Some((candidate, total));
            }
        }
        if let Some((subject, _)) = best {
            medoids.push(subject);
        }
    }
    Ok(medoids)
}

fn ensure_same_subjects(
    dissimilarities: &DissimilarityMatrix,
    assignment: &ClusterAssignment,
) -> Result<()> {
    if dissimilarities.dim() != assignment.subject_count() {
        return Err(ProfileError::data_integrity(
            Stage::Cluster,
            format!(
                "assignment covers {} subjects, dissimilarities cover {}",
                assignment.subject_count(),
                dissimilarities.dim()
            ),
        ));
    }
    Ok(())
}
