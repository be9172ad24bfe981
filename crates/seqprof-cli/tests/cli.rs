//! Argument parsing and end-to-end command runs.

use std::path::Path;

use clap::Parser;

use seqprof_cli::cli::{Cli, Command};
use seqprof_cli::commands::{run_costs, run_profile, run_schema};
use seqprof_cli::types::FeatureDecision;

const SURVEY: &str = "record_id,q1,q2,q3,sport\n\
                      r1,A,A,NA,Yes\n\
                      r2,A,B,B,Yes\n\
                      r3,B,B,A,No\n";

const STUDY: &str = r#"
[schema]
subject_id = "record_id"

[[schema.feature]]
name = "record_id"
kind = "excluded"

[[schema.feature]]
name = "q1"

[[schema.feature]]
name = "q2"

[[schema.feature]]
name = "q3"

[[schema.feature]]
name = "sport"
kind = "excluded"

[profile]
variables = ["sport"]
"#;

fn write_study(dir: &Path) -> (String, String) {
    let survey = dir.join("wave1.csv");
    let config = dir.join("study.toml");
    std::fs::write(&survey, SURVEY).unwrap();
    std::fs::write(&config, STUDY).unwrap();
    (
        survey.display().to_string(),
        config.display().to_string(),
    )
}

#[test]
fn parses_run_flags() {
    let cli = Cli::try_parse_from([
        "seqprof",
        "run",
        "survey.csv",
        "-k",
        "3",
        "--linkage",
        "ward-d2",
        "--cost-method",
        "constant",
        "-f",
        "q2",
        "-f",
        "q1",
        "--profile",
        "sport",
        "-vv",
    ])
    .unwrap();
    let Command::Run(args) = cli.command else {
        panic!("expected run command");
    };
    assert_eq!(args.clusters, Some(3));
    assert_eq!(args.input.features, vec!["q2", "q1"]);
    assert_eq!(args.profile, vec!["sport"]);
    assert_eq!(args.input.separator, ',');
    assert!(cli.verbosity.is_present());
}

#[test]
fn rejects_unknown_linkage() {
    let result = Cli::try_parse_from(["seqprof", "run", "survey.csv", "--linkage", "average"]);
    assert!(result.is_err());
}

#[test]
fn run_writes_artifacts_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let (survey, config) = write_study(dir.path());
    let cli = Cli::try_parse_from(["seqprof", "run", &survey, "-c", &config, "--no-progress"])
        .unwrap();
    let Command::Run(args) = cli.command else {
        panic!("expected run command");
    };

    let result = run_profile(&args).unwrap();
    assert_eq!(result.output_dir, dir.path().join("wave1-profiles"));
    assert!(result.manifest.is_file());
    // q3 has a missing answer and is dropped.
    assert_eq!(result.counts.dropped_features, vec!["q3"]);
    assert_eq!(result.counts.features, 2);
    let sizes: Vec<usize> = result.clusters.iter().map(|c| c.size).collect();
    assert_eq!(sizes, vec![2, 1]);
    assert_eq!(result.clusters[0].medoid, "r1");
    assert_eq!(result.profiles.len(), 1);
    assert_eq!(result.artifact_count, 8);

    let assignment =
        std::fs::read_to_string(result.output_dir.join("assignment.csv")).unwrap();
    assert!(assignment.starts_with("subject,cluster,silhouette\nr1,1,"));
}

#[test]
fn feature_flags_override_config() {
    let dir = tempfile::tempdir().unwrap();
    let (survey, config) = write_study(dir.path());
    let out = dir.path().join("out");
    let out = out.display().to_string();
    let cli = Cli::try_parse_from([
        "seqprof",
        "run",
        &survey,
        "-c",
        &config,
        "-f",
        "q2",
        "-f",
        "q1",
        "-o",
        &out,
        "--cost-method",
        "constant",
        "--no-progress",
    ])
    .unwrap();
    let Command::Run(args) = cli.command else {
        panic!("expected run command");
    };

    let result = run_profile(&args).unwrap();
    assert!(result.counts.dropped_features.is_empty());
    let coded = std::fs::read_to_string(Path::new(&out).join("coded_table.csv")).unwrap();
    assert_eq!(coded, "subject,q2,q1\nr1,1,1\nr2,2,1\nr3,2,2\n");
}

#[test]
fn schema_report_marks_dropped_features() {
    let dir = tempfile::tempdir().unwrap();
    let (survey, config) = write_study(dir.path());
    let cli = Cli::try_parse_from(["seqprof", "schema", &survey, "-c", &config]).unwrap();
    let Command::Schema(args) = cli.command else {
        panic!("expected schema command");
    };

    let report = run_schema(&args).unwrap();
    assert_eq!(report.subjects, 3);
    let decisions: Vec<(&str, FeatureDecision)> = report
        .features
        .iter()
        .map(|row| (row.name.as_str(), row.decision))
        .collect();
    assert_eq!(
        decisions,
        vec![
            ("record_id", FeatureDecision::NotSequenced),
            ("q1", FeatureDecision::Encoded),
            ("q2", FeatureDecision::Encoded),
            ("q3", FeatureDecision::DroppedMissing),
            ("sport", FeatureDecision::NotSequenced),
        ]
    );
    assert!(report.undeclared.is_empty());
}

#[test]
fn costs_report_transition_rate_costs() {
    let dir = tempfile::tempdir().unwrap();
    let (survey, config) = write_study(dir.path());
    let cli = Cli::try_parse_from(["seqprof", "costs", &survey, "-c", &config]).unwrap();
    let Command::Costs(args) = cli.command else {
        panic!("expected costs command");
    };

    let report = run_costs(&args).unwrap();
    assert_eq!(report.labels, vec!["1", "2"]);
    assert!((report.costs[0][1] - 1.5).abs() < 1e-12);
    assert!((report.costs[1][0] - 1.5).abs() < 1e-12);
    assert!(report.costs[0][0].abs() < 1e-12);
    assert!(report.low_support.is_empty());
    assert!(report.metric);
}
