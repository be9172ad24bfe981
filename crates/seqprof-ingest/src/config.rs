//! Study configuration file.
//!
//! A study is described by one TOML file holding the survey schema, the
//! analysis options and the variables to profile clusters against:
//!
//! ```toml
//! [schema]
//! missing_markers = ["NA"]
//!
//! [[schema.feature]]
//! name = "record_id"
//! kind = "excluded"
//!
//! [[schema.feature]]
//! name = "endurance_sport"
//! levels = ["No", "Yes"]
//!
//! [analysis]
//! indel_cost = 1.0
//! clusters = 2
//!
//! [profile]
//! variables = ["endurance_sport", "age_group"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use seqprof_model::{PipelineOptions, SurveySchema};

use crate::error::{IngestError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyConfig {
    #[serde(default)]
    pub schema: SurveySchema,
    #[serde(default)]
    pub analysis: PipelineOptions,
    #[serde(default)]
    pub profile: ProfileSettings,
}

/// Study variables the cluster profiler reports on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSettings {
    #[serde(default)]
    pub variables: Vec<String>,
}

pub fn parse_study_config(text: &str, path: &Path) -> Result<StudyConfig> {
    toml::from_str(text).map_err(|source| IngestError::Config {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_study_config(path: &Path) -> Result<StudyConfig> {
    let text = std::fs::read_to_string(path).map_err(|e| IngestError::io(path, e))?;
    let config = parse_study_config(&text, path)?;
    debug!(
        path = %path.display(),
        feature_count = config.schema.features.len(),
        profile_variables = config.profile.variables.len(),
        "study config loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqprof_model::{FeatureKind, Linkage};

    #[test]
    fn parses_full_config() {
        let text = r#"
[schema]
missing_markers = ["NA", "?"]

[[schema.feature]]
name = "record_id"
kind = "excluded"

[[schema.feature]]
name = "sport"
levels = ["No", "Yes"]

[analysis]
indel_cost = 1.5
clusters = 3
linkage = "ward-d2"

[profile]
variables = ["sport"]
"#;
        let config = parse_study_config(text, Path::new("study.toml")).unwrap();
        assert_eq!(config.schema.features.len(), 2);
        assert_eq!(config.schema.features[0].kind, FeatureKind::Excluded);
        assert!(config.schema.is_missing("?"));
        assert!((config.analysis.indel_cost - 1.5).abs() < f64::EPSILON);
        assert_eq!(config.analysis.clusters, 3);
        assert_eq!(config.analysis.linkage, Linkage::WardD2);
        assert_eq!(config.profile.variables, vec!["sport"]);
    }

    #[test]
    fn analysis_section_is_optional() {
        let text = r#"
[[schema.feature]]
name = "sport"
"#;
        let config = parse_study_config(text, Path::new("study.toml")).unwrap();
        assert_eq!(config.analysis, PipelineOptions::default());
        assert!(config.profile.variables.is_empty());
        assert!(config.schema.is_missing("NA"));
    }

    #[test]
    fn reports_parse_errors_with_path() {
        let err = parse_study_config("[analysis]\nclusters = \"two\"\n", Path::new("bad.toml"))
            .unwrap_err();
        assert!(err.to_string().starts_with("failed to parse study config bad.toml"));
    }
}
