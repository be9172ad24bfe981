use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use seqprof_core::{
    PipelineInput, cluster_summaries, prepare_costs, run_counts, run_pipeline_with_progress,
    write_outputs,
};
use seqprof_ingest::{
    ColumnHint, StudyConfig, SurveyFrame, SurveyReadOptions, build_column_hints, load_study_config,
    read_survey_csv_with_options,
};
use seqprof_model::{FeatureKind, FeatureSpec, PipelineOptions, SurveySchema};

use crate::cli::{AnalysisArgs, CostsArgs, InputArgs, RunArgs};
use crate::progress::DistanceBar;
use crate::types::{CostReport, FeatureDecision, FeatureRow, RunResult, SchemaReport};

pub struct LoadedStudy {
    pub frame: SurveyFrame,
    pub config: StudyConfig,
}

/// Read the config (if any), apply CLI overrides and load the survey table.
pub fn load_study(args: &InputArgs) -> Result<LoadedStudy> {
    let mut config = match &args.config {
        Some(path) => {
            load_study_config(path).with_context(|| format!("load config {}", path.display()))?
        }
        None => StudyConfig::default(),
    };
    if !args.features.is_empty() {
        apply_feature_allow_list(&mut config.schema, &args.features);
    }
    if let Some(column) = &args.subject_id {
        config.schema.subject_id = Some(column.clone());
    }
    if !args.separator.is_ascii() {
        bail!(
            "separator must be a single ASCII character, got '{}'",
            args.separator
        );
    }
    let read_options = SurveyReadOptions::default().with_separator(args.separator as u8);
    let frame = read_survey_csv_with_options(&args.input, read_options)
        .with_context(|| format!("read {}", args.input.display()))?;
    Ok(LoadedStudy { frame, config })
}

/// Make `features` the categorical allow-list, in the given order.
///
/// Other categorical features become excluded; names the schema does not
/// know are added as categorical.
pub fn apply_feature_allow_list(schema: &mut SurveySchema, features: &[String]) {
    let mut listed = Vec::with_capacity(features.len());
    for name in features {
        let spec = match schema.features.iter().position(|spec| &spec.name == name) {
            Some(index) => {
                let mut spec = schema.features.remove(index);
                spec.kind = FeatureKind::Categorical;
                spec
            }
            None => FeatureSpec::categorical(name.clone()),
        };
        listed.push(spec);
    }
    for spec in &mut schema.features {
        if spec.kind == FeatureKind::Categorical {
            spec.kind = FeatureKind::Excluded;
            spec.levels = None;
        }
    }
    schema.features.extend(listed);
}

fn analysis_options(base: &PipelineOptions, analysis: &AnalysisArgs) -> PipelineOptions {
    let mut options = base.clone();
    if let Some(indel) = analysis.indel {
        options.indel_cost = indel;
    }
    if let Some(method) = analysis.cost_method {
        options.cost_method = method.into();
    }
    if let Some(space) = analysis.state_space {
        options.state_space = space.into();
    }
    options
}

pub fn run_options(base: &PipelineOptions, args: &RunArgs) -> PipelineOptions {
    let mut options = analysis_options(base, &args.analysis);
    if let Some(clusters) = args.clusters {
        options.clusters = clusters;
    }
    if let Some(linkage) = args.linkage {
        options.linkage = linkage.into();
    }
    if let Some(threads) = args.threads {
        options.threads = threads;
    }
    options
}

/// `<stem>-profiles` next to the survey file.
pub fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "survey".to_string());
    input.with_file_name(format!("{stem}-profiles"))
}

pub fn run_profile(args: &RunArgs) -> Result<RunResult> {
    let input = &args.input.input;
    let run_span = info_span!("run", input = %input.display());
    let _run_guard = run_span.enter();
    let start = Instant::now();

    let LoadedStudy { frame, config } = load_study(&args.input)?;
    let options = run_options(&config.analysis, args);
    let variables = if args.profile.is_empty() {
        config.profile.variables.clone()
    } else {
        args.profile.clone()
    };

    let bar = DistanceBar::new(!args.no_progress);
    let output = run_pipeline_with_progress(
        PipelineInput {
            frame: &frame,
            schema: &config.schema,
            options: &options,
            profile_variables: &variables,
        },
        &bar,
    )
    .with_context(|| format!("profile {}", input.display()))?;

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(input));
    let written = write_outputs(&output_dir, &output, &options, Some(input))?;
    info!(
        subject_count = output.sequences.len(),
        clusters = output.assignment.k(),
        duration_ms = start.elapsed().as_millis(),
        "run complete"
    );

    Ok(RunResult {
        input: input.clone(),
        output_dir,
        manifest: written.manifest,
        counts: run_counts(&output),
        clusters: cluster_summaries(&output),
        average_silhouette: output.silhouette.average,
        artifact_count: written.artifacts.len(),
        profiles: output.profiles,
    })
}

/// What the encoder would do with every declared feature.
pub fn run_schema(args: &InputArgs) -> Result<SchemaReport> {
    let LoadedStudy { frame, config } = load_study(args)?;
    let schema = &config.schema;
    let hints = build_column_hints(&frame, schema).context("inspect survey columns")?;

    let features = schema
        .features
        .iter()
        .map(|spec| {
            let hint = hints.get(&spec.name);
            let decision = match (spec.kind, hint) {
                (FeatureKind::Categorical, None) => FeatureDecision::Absent,
                (FeatureKind::Categorical, Some(hint)) if !hint.is_complete() => {
                    FeatureDecision::DroppedMissing
                }
                (FeatureKind::Categorical, Some(_)) => FeatureDecision::Encoded,
                _ => FeatureDecision::NotSequenced,
            };
            FeatureRow {
                name: spec.name.clone(),
                kind: spec.kind.as_str().to_string(),
                in_table: hint.is_some(),
                distinct: hint.map_or(0, ColumnHint::distinct_count),
                missing: hint.map_or(0, |hint| hint.missing_count),
                decision,
            }
        })
        .collect();
    let undeclared = hints
        .keys()
        .filter(|name| schema.feature(name).is_none())
        .cloned()
        .collect();

    Ok(SchemaReport {
        input: args.input.clone(),
        subjects: frame.subject_count(),
        features,
        undeclared,
    })
}

/// Stages 1 to 4 only.
pub fn run_costs(args: &CostsArgs) -> Result<CostReport> {
    let LoadedStudy { frame, config } = load_study(&args.input)?;
    let options = analysis_options(&config.analysis, &args.analysis);
    let stages = prepare_costs(&frame, &config.schema, &options)
        .with_context(|| format!("derive costs for {}", args.input.input.display()))?;

    let alphabet = stages.sequences.alphabet();
    Ok(CostReport {
        labels: alphabet.labels().to_vec(),
        costs: stages.costs.matrix().rows().map(<[f64]>::to_vec).collect(),
        low_support: stages
            .rates
            .low_support()
            .iter()
            .filter_map(|&index| alphabet.label(index).map(str::to_string))
            .collect(),
        metric: stages.costs.is_metric(),
    })
}
