//! Survey answer profiles: the stage pipeline and its outputs.
//!
//! [`run_pipeline`] threads one survey table through encoding, sequence
//! building, transition rates, substitution costs, Optimal Matching, Ward
//! clustering and cluster profiling. [`write_outputs`] persists the result.

pub mod outputs;
pub mod pipeline;

pub use outputs::{WrittenOutputs, cluster_summaries, run_counts, write_outputs};
pub use pipeline::{
    CostStages, PipelineInput, PipelineOutput, TRIANGLE_CHECK_LIMIT, prepare_costs, run_pipeline,
    run_pipeline_with_progress, subject_ids,
};
pub use seqprof_distance::DistanceProgress;
