pub mod error;
pub mod matrix;
pub mod options;
pub mod redact;
pub mod schema;
pub mod state;

pub use error::{ProfileError, Result, Stage};
pub use matrix::SquareMatrix;
pub use options::{
    CostMethod, DEFAULT_CLUSTER_COUNT, DEFAULT_INDEL_COST, Linkage, MAX_SUBSTITUTION_COST,
    PipelineOptions, StateSpace,
};
pub use redact::{REDACTED_VALUE, log_data_enabled, redact_value, set_log_data};
pub use schema::{DEFAULT_MISSING_MARKERS, FeatureKind, FeatureSpec, SurveySchema};
pub use state::{Alphabet, Sequence, State};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_names_stage() {
        let err = ProfileError::configuration(Stage::Cluster, "k must be <= 3");
        assert_eq!(
            err.to_string(),
            "configuration error in cluster stage: k must be <= 3"
        );
        assert_eq!(err.stage(), Stage::Cluster);
    }

    #[test]
    fn options_serialize() {
        let options = PipelineOptions::default();
        let json = serde_json::to_string(&options).expect("serialize options");
        let round: PipelineOptions = serde_json::from_str(&json).expect("deserialize options");
        assert_eq!(round, options);
        assert!(json.contains("\"ward-d\""));
    }
}
