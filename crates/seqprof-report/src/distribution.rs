//! Per-cluster state frequencies at every sequence position.

use serde::Serialize;

use seqprof_cluster::ClusterAssignment;
use seqprof_model::{ProfileError, Result, Stage};
use seqprof_sequence::SequenceSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterStateDistribution {
    pub cluster: usize,
    pub size: usize,
    /// `shares[position][alphabet index]`, each position summing to 1.
    pub shares: Vec<Vec<f64>>,
}

impl ClusterStateDistribution {
    /// Alphabet index with the largest share at `position`, lowest on ties.
    pub fn modal_state(&self, position: usize) -> Option<usize> {
        let shares = self.shares.get(position)?;
        let mut best: Option<(usize, f64)> = None;
        for (index, &share) in shares.iter().enumerate() {
            if best.is_none_or(|(_, current)| share > current) {
                best = Some((index, share));
            }
        }
        best.map(|(index, _)| index)
    }
}

pub fn state_distributions(
    set: &SequenceSet,
    assignment: &ClusterAssignment,
) -> Result<Vec<ClusterStateDistribution>> {
    if set.len() != assignment.subject_count() {
        return Err(ProfileError::data_integrity(
            Stage::Profile,
            format!(
                "assignment covers {} subjects, sequence set has {}",
                assignment.subject_count(),
                set.len()
            ),
        ));
    }
    let length = set.length();
    let dim = set.alphabet().len();
    let sizes = assignment.sizes();

    let mut counts = vec![vec![vec![0usize; dim]; length]; assignment.k()];
    for (sequence, &label) in set.indexed().iter().zip(assignment.labels()) {
        for (position, &index) in sequence.iter().enumerate() {
            counts[label - 1][position][index] += 1;
        }
    }

    Ok(counts
        .into_iter()
        .zip(sizes)
        .enumerate()
        .map(|(offset, (positions, size))| ClusterStateDistribution {
            cluster: offset + 1,
            size,
            shares: positions
                .into_iter()
                .map(|row| row.into_iter().map(|count| count as f64 / size as f64).collect())
                .collect(),
        })
        .collect())
}
