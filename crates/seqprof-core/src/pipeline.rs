//! Stage pipeline.
//!
//! 1. **encode** - allow-listed answers to codes
//! 2. **sequence** - one state sequence per subject
//! 3. **transition** - empirical transition rates
//! 4. **substitution** - cost table from the rates
//! 5. **distance** - Optimal Matching dissimilarities
//! 6. **cluster** - Ward dendrogram cut at k, with quality measures
//! 7. **profile** - clusters against study variables
//!
//! Every stage reads the previous stage's output and nothing else, and the
//! first failing stage ends the run.

use std::time::Instant;

use tracing::{debug, info_span, warn};

use seqprof_cluster::{
    ClusterAssignment, Dendrogram, Silhouette, medoids, silhouette, ward_clustering,
};
use seqprof_distance::{
    DissimilarityMatrix, DistanceOptions, DistanceProgress, compute_dissimilarities_with_progress,
};
use seqprof_ingest::SurveyFrame;
use seqprof_model::{PipelineOptions, ProfileError, Result, Stage, SurveySchema};
use seqprof_report::{
    ClusterProfiler, ClusterStateDistribution, VariableProfile, state_distributions,
};
use seqprof_sequence::{
    CodedTable, SequenceSet, SubstitutionCosts, TransitionRates, build_sequences, encode_features,
    estimate_transition_rates, substitution_costs,
};

/// Subjects above which the triangle-inequality scan is skipped.
pub const TRIANGLE_CHECK_LIMIT: usize = 300;

const TRIANGLE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
pub struct PipelineInput<'a> {
    pub frame: &'a SurveyFrame,
    pub schema: &'a SurveySchema,
    pub options: &'a PipelineOptions,
    pub profile_variables: &'a [String],
}

/// Outputs of stages 1 to 4.
#[derive(Debug, Clone)]
pub struct CostStages {
    pub coded: CodedTable,
    pub sequences: SequenceSet,
    pub rates: TransitionRates,
    pub costs: SubstitutionCosts,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub subject_ids: Vec<String>,
    pub coded: CodedTable,
    pub sequences: SequenceSet,
    pub rates: TransitionRates,
    pub costs: SubstitutionCosts,
    pub dissimilarities: DissimilarityMatrix,
    pub dendrogram: Dendrogram,
    pub assignment: ClusterAssignment,
    pub silhouette: Silhouette,
    /// Medoid subject index per cluster.
    pub medoids: Vec<usize>,
    pub distributions: Vec<ClusterStateDistribution>,
    pub profiles: Vec<VariableProfile>,
    /// `None` when the scan was skipped for size.
    pub triangle_violations: Option<usize>,
}

struct NoProgress;

impl DistanceProgress for NoProgress {
    fn advance(&self, _rows: usize) {}
}

pub fn run_pipeline(input: PipelineInput<'_>) -> Result<PipelineOutput> {
    run_pipeline_with_progress(input, &NoProgress)
}

pub fn run_pipeline_with_progress(
    input: PipelineInput<'_>,
    progress: &dyn DistanceProgress,
) -> Result<PipelineOutput> {
    let subject_ids = subject_ids(input.frame, input.schema)?;
    let CostStages {
        coded,
        sequences,
        rates,
        costs,
    } = prepare_costs(input.frame, input.schema, input.options)?;
    let options = input.options;

    let dissimilarities = info_span!("distance").in_scope(|| -> Result<_> {
        let start = Instant::now();
        let matrix = compute_dissimilarities_with_progress(
            &sequences,
            &costs,
            DistanceOptions {
                indel_cost: options.indel_cost,
                threads: options.threads,
            },
            progress,
        )?;
        debug!(
            subject_count = matrix.dim(),
            duration_ms = start.elapsed().as_millis(),
            "distance stage complete"
        );
        Ok(matrix)
    })?;
    let triangle_violations = triangle_diagnostic(&dissimilarities, &costs);

    let (dendrogram, assignment, silhouette, medoids) =
        info_span!("cluster").in_scope(|| -> Result<_> {
            let start = Instant::now();
            let dendrogram = ward_clustering(&dissimilarities, options.linkage)?;
            let assignment = dendrogram.cut(options.clusters)?;
            let widths = silhouette(&dissimilarities, &assignment)?;
            let medoids = medoids(&dissimilarities, &assignment)?;
            debug!(
                clusters = assignment.k(),
                sizes = ?assignment.sizes(),
                average_silhouette = widths.average,
                duration_ms = start.elapsed().as_millis(),
                "cluster stage complete"
            );
            Ok((dendrogram, assignment, widths, medoids))
        })?;

    let (distributions, profiles) = info_span!("profile").in_scope(|| -> Result<_> {
        let start = Instant::now();
        let distributions = state_distributions(&sequences, &assignment)?;
        let profiles = ClusterProfiler::new(input.frame, input.schema)
            .profile(&assignment, input.profile_variables)?;
        debug!(
            variables = profiles.len(),
            duration_ms = start.elapsed().as_millis(),
            "profile stage complete"
        );
        Ok((distributions, profiles))
    })?;

    Ok(PipelineOutput {
        subject_ids,
        coded,
        sequences,
        rates,
        costs,
        dissimilarities,
        dendrogram,
        assignment,
        silhouette,
        medoids,
        distributions,
        profiles,
        triangle_violations,
    })
}

/// Stages 1 to 4: everything needed to inspect substitution costs.
pub fn prepare_costs(
    frame: &SurveyFrame,
    schema: &SurveySchema,
    options: &PipelineOptions,
) -> Result<CostStages> {
    options.validate()?;

    let coded = info_span!("encode", subject_count = frame.subject_count())
        .in_scope(|| encode_features(frame, schema, options.state_space))?;
    let sequences = info_span!("sequence").in_scope(|| build_sequences(&coded))?;
    let rates = info_span!("transition").in_scope(|| estimate_transition_rates(&sequences))?;
    let costs =
        info_span!("substitution").in_scope(|| substitution_costs(&rates, options.cost_method))?;

    Ok(CostStages {
        coded,
        sequences,
        rates,
        costs,
    })
}

/// Identifiers from the schema's subject id column, else 1-based row numbers.
pub fn subject_ids(frame: &SurveyFrame, schema: &SurveySchema) -> Result<Vec<String>> {
    let Some(column) = &schema.subject_id else {
        return Ok((1..=frame.subject_count())
            .map(|row| row.to_string())
            .collect());
    };
    if !frame.has_column(column) {
        return Err(ProfileError::configuration(
            Stage::Ingest,
            format!("subject id column '{column}' is not in the survey table"),
        ));
    }
    let values = frame
        .text_column(column)
        .map_err(|e| ProfileError::data_integrity(Stage::Ingest, e.to_string()))?;
    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.filter(|id| !id.is_empty()).ok_or_else(|| {
                ProfileError::data_integrity(
                    Stage::Ingest,
                    format!("subject id column '{column}' is empty in row {row}"),
                )
            })
        })
        .collect()
}

fn triangle_diagnostic(
    dissimilarities: &DissimilarityMatrix,
    costs: &SubstitutionCosts,
) -> Option<usize> {
    if dissimilarities.dim() > TRIANGLE_CHECK_LIMIT {
        debug!(
            subject_count = dissimilarities.dim(),
            limit = TRIANGLE_CHECK_LIMIT,
            "triangle inequality scan skipped"
        );
        return None;
    }
    let violations = dissimilarities.triangle_violations(TRIANGLE_TOLERANCE);
    if violations > 0 {
        warn!(
            violations,
            metric_costs = costs.is_metric(),
            "dissimilarities violate the triangle inequality"
        );
    }
    Some(violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqprof_model::{FeatureSpec, SquareMatrix};

    fn frame() -> SurveyFrame {
        SurveyFrame::from_columns(vec![
            ("id", vec![Some("r1"), Some("r2"), Some("r3")]),
            ("q1", vec![Some("A"), Some("A"), Some("B")]),
            ("q2", vec![Some("A"), Some("B"), Some("B")]),
        ])
        .unwrap()
    }

    fn schema() -> SurveySchema {
        SurveySchema::new(vec![FeatureSpec::categorical("q1"), FeatureSpec::categorical("q2")])
    }

    #[test]
    fn triangle_scan_is_skipped_above_the_limit() {
        let costs = SubstitutionCosts::constant(2, 2.0).unwrap();
        let small = DissimilarityMatrix::from_matrix(SquareMatrix::zeros(3)).unwrap();
        assert_eq!(triangle_diagnostic(&small, &costs), Some(0));
        let large =
            DissimilarityMatrix::from_matrix(SquareMatrix::zeros(TRIANGLE_CHECK_LIMIT + 1))
                .unwrap();
        assert_eq!(triangle_diagnostic(&large, &costs), None);
    }

    #[test]
    fn subject_ids_default_to_row_numbers() {
        assert_eq!(subject_ids(&frame(), &schema()).unwrap(), vec!["1", "2", "3"]);
        let schema = schema().with_subject_id("id");
        assert_eq!(subject_ids(&frame(), &schema).unwrap(), vec!["r1", "r2", "r3"]);
    }

    #[test]
    fn unknown_subject_id_column_is_rejected() {
        let schema = schema().with_subject_id("record");
        let err = subject_ids(&frame(), &schema).unwrap_err();
        assert!(matches!(err, ProfileError::Configuration { stage: Stage::Ingest, .. }));
    }

    #[test]
    fn invalid_options_fail_before_encoding() {
        let options = PipelineOptions::default().with_indel_cost(-1.0);
        let err = prepare_costs(&frame(), &schema(), &options).unwrap_err();
        assert!(matches!(err, ProfileError::Configuration { stage: Stage::Distance, .. }));
    }
}
