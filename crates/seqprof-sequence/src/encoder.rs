//! Categorical encoding of raw survey answers.
//!
//! Each allow-listed feature is checked for missing values; complete
//! features get a stable label → code mapping (declared level order, or
//! lexicographic order of observed values) and incomplete ones are dropped
//! and reported.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::{Column, DataFrame, PolarsResult};
use tracing::{debug, info, trace, warn};

use seqprof_ingest::SurveyFrame;
use seqprof_model::{
    FeatureSpec, ProfileError, Result, Stage, State, StateSpace, SurveySchema, redact_value,
};

/// Label ↔ code mapping of one retained feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureCoding {
    pub name: String,
    /// Labels in code order; `labels[i]` has local code `i + 1`.
    pub labels: Vec<String>,
    /// Added to local codes to form states (non-zero only for the
    /// feature-scoped state space).
    pub offset: u32,
}

impl FeatureCoding {
    pub fn local_code(&self, label: &str) -> Option<u32> {
        self.labels
            .iter()
            .position(|candidate| candidate == label)
            .map(|index| index as u32 + 1)
    }

    pub fn state_of(&self, label: &str) -> Option<State> {
        self.local_code(label)
            .map(|code| State::new(code + self.offset))
    }

    /// Label of a state produced by this feature.
    pub fn label_of(&self, state: State) -> Option<&str> {
        let local = state.code().checked_sub(self.offset)?;
        let index = local.checked_sub(1)? as usize;
        self.labels.get(index).map(String::as_str)
    }

    pub fn states(&self) -> impl Iterator<Item = State> + '_ {
        (1..=self.labels.len() as u32).map(|code| State::new(code + self.offset))
    }
}

/// An allow-listed feature left out of the sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFeature {
    pub name: String,
    pub missing_count: usize,
}

/// Subjects × retained features, integer coded.
#[derive(Debug, Clone)]
pub struct CodedTable {
    features: Vec<FeatureCoding>,
    columns: Vec<Vec<Option<State>>>,
    dropped: Vec<DroppedFeature>,
    subject_count: usize,
    state_space: StateSpace,
}

impl CodedTable {
    /// Assemble a coded table from already-coded columns.
    ///
    /// Column lengths are not checked here; the sequence builder rejects
    /// ragged input.
    pub fn from_columns(
        features: Vec<FeatureCoding>,
        columns: Vec<Vec<Option<State>>>,
        state_space: StateSpace,
    ) -> Result<Self> {
        if features.len() != columns.len() {
            return Err(ProfileError::data_integrity(
                Stage::Encode,
                format!(
                    "{} feature codings for {} coded columns",
                    features.len(),
                    columns.len()
                ),
            ));
        }
        let subject_count = columns.first().map_or(0, Vec::len);
        Ok(Self {
            features,
            columns,
            dropped: Vec::new(),
            subject_count,
            state_space,
        })
    }

    pub fn features(&self) -> &[FeatureCoding] {
        &self.features
    }

    pub fn columns(&self) -> &[Vec<Option<State>>] {
        &self.columns
    }

    pub fn dropped(&self) -> &[DroppedFeature] {
        &self.dropped
    }

    pub fn subject_count(&self) -> usize {
        self.subject_count
    }

    pub fn state_space(&self) -> StateSpace {
        self.state_space
    }

    /// The coded table as a Polars frame (one `UInt32` column per feature).
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let columns: Vec<Column> = self
            .features
            .iter()
            .zip(&self.columns)
            .map(|(feature, codes)| {
                let values: Vec<Option<u32>> =
                    codes.iter().map(|state| state.map(State::code)).collect();
                Column::new(feature.name.as_str().into(), values)
            })
            .collect();
        DataFrame::new(columns)
    }
}

/// Encode the allow-listed categorical features of `frame`.
pub fn encode_features(
    frame: &SurveyFrame,
    schema: &SurveySchema,
    state_space: StateSpace,
) -> Result<CodedTable> {
    schema.validate()?;

    let absent: Vec<&str> = schema
        .categorical()
        .filter(|spec| !frame.has_column(&spec.name))
        .map(|spec| spec.name.as_str())
        .collect();
    if !absent.is_empty() {
        return Err(ProfileError::configuration(
            Stage::Encode,
            format!(
                "allow-listed feature(s) absent from the dataset: {}",
                absent.join(", ")
            ),
        ));
    }

    let mut features = Vec::new();
    let mut columns = Vec::new();
    let mut dropped = Vec::new();
    let mut offset = 0u32;

    for spec in schema.categorical() {
        let values = frame
            .text_column(&spec.name)
            .map_err(|e| ProfileError::data_integrity(Stage::Encode, e.to_string()))?;
        let missing_count = values
            .iter()
            .filter(|value| value.as_deref().is_none_or(|v| schema.is_missing(v)))
            .count();
        if missing_count > 0 {
            warn!(
                feature = %spec.name,
                missing_count,
                "feature dropped: missing values"
            );
            dropped.push(DroppedFeature {
                name: spec.name.clone(),
                missing_count,
            });
            continue;
        }

        let present: Vec<&str> = values.iter().flatten().map(String::as_str).collect();
        let labels = feature_labels(spec, &present)?;
        let coding = FeatureCoding {
            name: spec.name.clone(),
            labels,
            offset: match state_space {
                StateSpace::Shared => 0,
                StateSpace::FeatureScoped => offset,
            },
        };
        offset += coding.labels.len() as u32;

        let lookup: BTreeMap<&str, State> = coding
            .labels
            .iter()
            .zip(coding.states())
            .map(|(label, state)| (label.as_str(), state))
            .collect();
        let codes = present
            .iter()
            .map(|value| lookup.get(value).copied())
            .collect();
        for (label, state) in coding.labels.iter().zip(coding.states()) {
            trace!(
                feature = %coding.name,
                level = redact_value(label),
                code = state.code(),
                "level coded"
            );
        }
        debug!(
            feature = %coding.name,
            level_count = coding.labels.len(),
            offset = coding.offset,
            "feature encoded"
        );
        features.push(coding);
        columns.push(codes);
    }

    if features.is_empty() {
        return Err(ProfileError::degenerate(
            Stage::Encode,
            "no allow-listed feature is complete across all subjects",
        ));
    }

    info!(
        retained = features.len(),
        dropped = dropped.len(),
        subject_count = frame.subject_count(),
        state_space = state_space.as_str(),
        "categorical encoding complete"
    );
    Ok(CodedTable {
        features,
        columns,
        dropped,
        subject_count: frame.subject_count(),
        state_space,
    })
}

fn feature_labels(spec: &FeatureSpec, present: &[&str]) -> Result<Vec<String>> {
    match &spec.levels {
        Some(levels) => {
            let declared: Vec<String> = levels.iter().map(|l| l.trim().to_string()).collect();
            if let Some(row) = present
                .iter()
                .position(|value| !declared.iter().any(|level| level == value))
            {
                let value = present[row];
                return Err(ProfileError::data_integrity(
                    Stage::Encode,
                    format!(
                        "value '{value}' of feature '{}' in row {row} is not a declared level",
                        spec.name
                    ),
                ));
            }
            Ok(declared)
        }
        None => {
            let observed: BTreeSet<&str> = present.iter().copied().collect();
            Ok(observed.into_iter().map(str::to_string).collect())
        }
    }
}
