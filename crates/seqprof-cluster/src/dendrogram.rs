//! Merge tree stored as an arena.
//!
//! Node ids `0..n` are the subjects (leaves); merge `m` creates node
//! `n + m`. Every merge record points at its two children by id.

use serde::Serialize;

use seqprof_model::{Linkage, ProfileError, Result, Stage};

use crate::assignment::ClusterAssignment;

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MergeNode {
    pub left: NodeId,
    pub right: NodeId,
    /// Merge cost on the dissimilarity scale.
    pub height: f64,
    /// Number of subjects below this node.
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dendrogram {
    leaves: usize,
    merges: Vec<MergeNode>,
    linkage: Linkage,
}

impl Dendrogram {
    pub(crate) fn new(leaves: usize, merges: Vec<MergeNode>, linkage: Linkage) -> Self {
        Self {
            leaves,
            merges,
            linkage,
        }
    }

    /// Number of subjects.
    pub fn leaves(&self) -> usize {
        self.leaves
    }

    /// Merges in the order they happened (`leaves - 1` of them).
    pub fn merges(&self) -> &[MergeNode] {
        &self.merges
    }

    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    pub fn heights(&self) -> Vec<f64> {
        self.merges.iter().map(|merge| merge.height).collect()
    }

    pub fn is_leaf(&self, node: NodeId) -> bool {
        node < self.leaves
    }

    pub fn merge(&self, node: NodeId) -> Option<&MergeNode> {
        node.checked_sub(self.leaves)
            .and_then(|index| self.merges.get(index))
    }

    pub fn root(&self) -> Option<NodeId> {
        match self.leaves {
            0 => None,
            1 => Some(0),
            n => Some(n + self.merges.len() - 1),
        }
    }

    /// Subjects under `node`, left to right.
    pub fn members(&self, node: NodeId) -> Vec<usize> {
        let mut members = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            match self.merge(current) {
                Some(merge) => {
                    stack.push(merge.right);
                    stack.push(merge.left);
                }
                None => members.push(current),
            }
        }
        members
    }

    /// Leaf order for drawing the tree.
    pub fn order(&self) -> Vec<usize> {
        self.root().map(|root| self.members(root)).unwrap_or_default()
    }

    /// Partition present once exactly `k` clusters remain.
    ///
    /// Cluster ids run `1..=k` in order of first appearance of subjects, so
    /// subject 0 is always in cluster 1.
    pub fn cut(&self, k: usize) -> Result<ClusterAssignment> {
        let n = self.leaves;
        if k < 1 || k > n {
            return Err(ProfileError::configuration(
                Stage::Cluster,
                format!("cluster count {k} is outside 1..={n} for {n} subjects"),
            ));
        }
        let applied = n - k;
        let mut parent: Vec<Option<NodeId>> = vec![None; n + applied];
        for (step, merge) in self.merges.iter().take(applied).enumerate() {
            let node = n + step;
            parent[merge.left] = Some(node);
            parent[merge.right] = Some(node);
        }

        let mut top_to_label: Vec<Option<usize>> = vec![None; n + applied];
        let mut next_label = 1;
        let mut labels = Vec::with_capacity(n);
        for subject in 0..n {
            let mut top = subject;
            while let Some(up) = parent[top] {
                top = up;
            }
            let label = *top_to_label[top].get_or_insert_with(|| {
                let label = next_label;
                next_label += 1;
                label
            });
            labels.push(label);
        }
        ClusterAssignment::new(labels, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ((0, 2), (1, 3)) then root.
    fn tree() -> Dendrogram {
        Dendrogram::new(
            4,
            vec![
                MergeNode { left: 0, right: 2, height: 1.0, size: 2 },
                MergeNode { left: 1, right: 3, height: 1.5, size: 2 },
                MergeNode { left: 4, right: 5, height: 4.0, size: 4 },
            ],
            Linkage::WardD,
        )
    }

    #[test]
    fn members_and_order_walk_left_to_right() {
        let tree = tree();
        assert_eq!(tree.root(), Some(6));
        assert_eq!(tree.members(5), vec![1, 3]);
        assert_eq!(tree.order(), vec![0, 2, 1, 3]);
    }

    #[test]
    fn cut_numbers_clusters_by_first_subject() {
        let tree = tree();
        assert_eq!(tree.cut(2).unwrap().labels(), &[1, 2, 1, 2]);
        assert_eq!(tree.cut(3).unwrap().labels(), &[1, 2, 1, 3]);
        assert_eq!(tree.cut(1).unwrap().labels(), &[1, 1, 1, 1]);
        assert_eq!(tree.cut(4).unwrap().labels(), &[1, 2, 3, 4]);
    }

    #[test]
    fn cut_rejects_out_of_range_k() {
        let tree = tree();
        assert!(matches!(
            tree.cut(0).unwrap_err(),
            ProfileError::Configuration { stage: Stage::Cluster, .. }
        ));
        assert!(tree.cut(5).is_err());
    }
}
