//! Loading a study config and survey table from disk together.

use std::fs;

use seqprof_ingest::{build_column_hints, load_study_config, read_survey_csv};
use seqprof_model::FeatureKind;

#[test]
fn loads_config_and_table_from_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config_path = dir.path().join("study.toml");
    let csv_path = dir.path().join("survey.csv");
    fs::write(
        &config_path,
        r#"
[[schema.feature]]
name = "record_id"
kind = "excluded"

[[schema.feature]]
name = "sport"

[[schema.feature]]
name = "smell_loss"

[analysis]
clusters = 2
"#,
    )
    .expect("write config");
    fs::write(
        &csv_path,
        "record_id,sport,smell_loss\nR1,Yes,No\nR2,No,NA\nR3,Yes,Yes\n",
    )
    .expect("write csv");

    let config = load_study_config(&config_path).expect("load config");
    let frame = read_survey_csv(&csv_path).expect("read csv");

    assert_eq!(frame.subject_count(), 3);
    assert_eq!(frame.source(), Some(csv_path.as_path()));
    assert_eq!(config.schema.features[0].kind, FeatureKind::Excluded);

    let hints = build_column_hints(&frame, &config.schema).expect("hints");
    assert!(hints["sport"].is_complete());
    assert_eq!(hints["smell_loss"].missing_count, 1);
    assert_eq!(hints["record_id"].distinct_count(), 3);
}
