//! Explicit survey schema.
//!
//! Every column the analysis may touch is declared up front with a
//! [`FeatureKind`]. Only `categorical` features enter the encoder, in the
//! order they are declared; that list is the feature allow-list. Column
//! types are never inferred from the data.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result, Stage};

/// Marker values treated as missing in addition to blank cells.
pub const DEFAULT_MISSING_MARKERS: &[&str] = &["NA"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureKind {
    /// Discrete answer that becomes one sequence position.
    #[default]
    Categorical,
    /// Derived numeric field, kept for reporting only.
    Numeric,
    /// Identifier, free text or date; never analyzed.
    Excluded,
}

impl FeatureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureKind::Categorical => "categorical",
            FeatureKind::Numeric => "numeric",
            FeatureKind::Excluded => "excluded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    /// Column name in the source table.
    pub name: String,
    #[serde(default)]
    pub kind: FeatureKind,
    /// Declared level order. Codes follow this order (first level = 1);
    /// without it, observed values are coded in lexicographic order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<Vec<String>>,
    /// Human-readable label used in reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FeatureSpec {
    pub fn categorical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Categorical,
            levels: None,
            label: None,
        }
    }

    pub fn with_kind(mut self, kind: FeatureKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_levels<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.levels = Some(levels.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveySchema {
    #[serde(rename = "feature", default)]
    pub features: Vec<FeatureSpec>,
    #[serde(default = "default_missing_markers")]
    pub missing_markers: Vec<String>,
    /// Column carrying subject identifiers for output files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
}

fn default_missing_markers() -> Vec<String> {
    DEFAULT_MISSING_MARKERS
        .iter()
        .map(|marker| (*marker).to_string())
        .collect()
}

impl Default for SurveySchema {
    fn default() -> Self {
        Self {
            features: Vec::new(),
            missing_markers: default_missing_markers(),
            subject_id: None,
        }
    }
}

impl SurveySchema {
    pub fn new(features: Vec<FeatureSpec>) -> Self {
        Self {
            features,
            ..Self::default()
        }
    }

    pub fn with_missing_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_subject_id(mut self, column: impl Into<String>) -> Self {
        self.subject_id = Some(column.into());
        self
    }

    pub fn feature(&self, name: &str) -> Option<&FeatureSpec> {
        self.features.iter().find(|spec| spec.name == name)
    }

    /// Categorical features in declaration order (the allow-list).
    pub fn categorical(&self) -> impl Iterator<Item = &FeatureSpec> {
        self.features
            .iter()
            .filter(|spec| spec.kind == FeatureKind::Categorical)
    }

    /// True for blank cells and configured missing markers.
    pub fn is_missing(&self, value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || self
                .missing_markers
                .iter()
                .any(|marker| marker.eq_ignore_ascii_case(trimmed))
    }

    /// Structural checks that do not need the data.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for spec in &self.features {
            if spec.name.trim().is_empty() {
                return Err(ProfileError::configuration(
                    Stage::Encode,
                    "feature with an empty name in schema",
                ));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(ProfileError::configuration(
                    Stage::Encode,
                    format!("feature '{}' declared twice", spec.name),
                ));
            }
            if let Some(levels) = &spec.levels {
                if spec.kind != FeatureKind::Categorical {
                    return Err(ProfileError::configuration(
                        Stage::Encode,
                        format!(
                            "feature '{}' declares levels but is {}",
                            spec.name,
                            spec.kind.as_str()
                        ),
                    ));
                }
                let mut distinct = BTreeSet::new();
                for level in levels {
                    if !distinct.insert(level.trim()) {
                        return Err(ProfileError::configuration(
                            Stage::Encode,
                            format!("feature '{}' repeats level '{level}'", spec.name),
                        ));
                    }
                }
            }
        }
        if let Some(id) = &self.subject_id
            && self
                .feature(id)
                .is_some_and(|spec| spec.kind == FeatureKind::Categorical)
        {
            return Err(ProfileError::configuration(
                Stage::Encode,
                format!("subject id column '{id}' cannot be a categorical feature"),
            ));
        }
        if self.categorical().next().is_none() {
            return Err(ProfileError::configuration(
                Stage::Encode,
                "schema declares no categorical features",
            ));
        }
        Ok(())
    }
}
