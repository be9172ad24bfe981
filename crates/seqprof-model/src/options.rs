//! Configuration options for the profiling pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result, Stage};

/// Default cost of one insertion or deletion.
pub const DEFAULT_INDEL_COST: f64 = 1.0;

/// Default number of clusters the dendrogram is cut into.
pub const DEFAULT_CLUSTER_COUNT: usize = 2;

/// Upper bound of a substitution cost derived from transition rates.
pub const MAX_SUBSTITUTION_COST: f64 = 2.0;

/// Ward linkage variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Linkage {
    /// Lance–Williams update applied to the dissimilarities as given.
    #[default]
    WardD,
    /// Lance–Williams update applied to squared dissimilarities; merge
    /// heights are reported on the original scale.
    WardD2,
}

impl Linkage {
    pub fn as_str(self) -> &'static str {
        match self {
            Linkage::WardD => "ward-d",
            Linkage::WardD2 => "ward-d2",
        }
    }
}

/// How substitution costs are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CostMethod {
    /// `2 - P(a→b) - P(b→a)`.
    #[default]
    TransitionRate,
    /// Every off-diagonal cost is the maximal penalty.
    Constant,
}

impl CostMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            CostMethod::TransitionRate => "transition-rate",
            CostMethod::Constant => "constant",
        }
    }
}

/// How answer codes map onto the global alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StateSpace {
    /// Codes `1..m` per feature; equal codes are the same symbol.
    #[default]
    Shared,
    /// Codes are offset per feature so every feature-value pair is unique.
    FeatureScoped,
}

impl StateSpace {
    pub fn as_str(self) -> &'static str {
        match self {
            StateSpace::Shared => "shared",
            StateSpace::FeatureScoped => "feature-scoped",
        }
    }
}

/// Options controlling the analysis stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Cost of one insertion or deletion during alignment.
    pub indel_cost: f64,
    /// Number of clusters to cut the dendrogram into.
    pub clusters: usize,
    pub linkage: Linkage,
    pub cost_method: CostMethod,
    pub state_space: StateSpace,
    /// Worker threads for the distance stage (0 = all cores).
    pub threads: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            indel_cost: DEFAULT_INDEL_COST,
            clusters: DEFAULT_CLUSTER_COUNT,
            linkage: Linkage::default(),
            cost_method: CostMethod::default(),
            state_space: StateSpace::default(),
            threads: 0,
        }
    }
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_indel_cost(mut self, indel_cost: f64) -> Self {
        self.indel_cost = indel_cost;
        self
    }

    #[must_use]
    pub fn with_clusters(mut self, clusters: usize) -> Self {
        self.clusters = clusters;
        self
    }

    #[must_use]
    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    #[must_use]
    pub fn with_cost_method(mut self, cost_method: CostMethod) -> Self {
        self.cost_method = cost_method;
        self
    }

    #[must_use]
    pub fn with_state_space(mut self, state_space: StateSpace) -> Self {
        self.state_space = state_space;
        self
    }

    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Checks that do not depend on the data. `k > N` is checked by the
    /// clustering stage once the subject count is known.
    pub fn validate(&self) -> Result<()> {
        if !self.indel_cost.is_finite() || self.indel_cost < 0.0 {
            return Err(ProfileError::configuration(
                Stage::Distance,
                format!(
                    "indel cost must be a non-negative number, got {}",
                    self.indel_cost
                ),
            ));
        }
        if self.clusters < 1 {
            return Err(ProfileError::configuration(
                Stage::Cluster,
                "cluster count must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let options = PipelineOptions::default();
        assert!((options.indel_cost - 1.0).abs() < f64::EPSILON);
        assert_eq!(options.clusters, 2);
        assert_eq!(options.linkage, Linkage::WardD);
        assert_eq!(options.cost_method, CostMethod::TransitionRate);
        assert_eq!(options.state_space, StateSpace::Shared);
    }

    #[test]
    fn negative_indel_is_rejected() {
        let err = PipelineOptions::new()
            .with_indel_cost(-0.5)
            .validate()
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Distance);
    }

    #[test]
    fn zero_clusters_is_rejected() {
        let err = PipelineOptions::new()
            .with_clusters(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ProfileError::Configuration { stage: Stage::Cluster, .. }));
    }

    #[test]
    fn partial_options_fill_defaults() {
        let options: PipelineOptions =
            serde_json::from_str(r#"{"clusters": 4, "linkage": "ward-d2"}"#).unwrap();
        assert_eq!(options.clusters, 4);
        assert_eq!(options.linkage, Linkage::WardD2);
        assert!((options.indel_cost - DEFAULT_INDEL_COST).abs() < f64::EPSILON);
    }
}
