use serde::Serialize;

use seqprof_model::{ProfileError, Result, Stage};

/// Cluster id (`1..=k`) for every subject, in subject order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterAssignment {
    labels: Vec<usize>,
    k: usize,
}

impl ClusterAssignment {
    /// Every id in `1..=k` must be used at least once.
    pub fn new(labels: Vec<usize>, k: usize) -> Result<Self> {
        let mut used = vec![false; k];
        for (subject, &label) in labels.iter().enumerate() {
            if label == 0 || label > k {
                return Err(ProfileError::data_integrity(
                    Stage::Cluster,
                    format!("subject {subject} has cluster id {label} outside 1..={k}"),
                ));
            }
            used[label - 1] = true;
        }
        if let Some(empty) = used.iter().position(|seen| !seen) {
            return Err(ProfileError::data_integrity(
                Stage::Cluster,
                format!("cluster {} has no members", empty + 1),
            ));
        }
        Ok(Self { labels, k })
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn subject_count(&self) -> usize {
        self.labels.len()
    }

    pub fn label(&self, subject: usize) -> Option<usize> {
        self.labels.get(subject).copied()
    }

    /// Members per cluster; index 0 is cluster 1.
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k];
        for &label in &self.labels {
            sizes[label - 1] += 1;
        }
        sizes
    }

    pub fn members(&self, cluster: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, label)| **label == cluster)
            .map(|(subject, _)| subject)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_and_members() {
        let assignment = ClusterAssignment::new(vec![1, 2, 1, 1], 2).unwrap();
        assert_eq!(assignment.sizes(), vec![3, 1]);
        assert_eq!(assignment.members(1), vec![0, 2, 3]);
        assert_eq!(assignment.label(1), Some(2));
    }

    #[test]
    fn unused_cluster_id_is_rejected() {
        assert!(ClusterAssignment::new(vec![1, 1, 3], 3).is_err());
        assert!(ClusterAssignment::new(vec![0, 1], 1).is_err());
    }
}
