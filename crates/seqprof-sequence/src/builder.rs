//! State sequences built from the coded table.

use std::collections::HashSet;

use tracing::info;

use seqprof_model::{Alphabet, ProfileError, Result, Sequence, Stage, State, StateSpace};

use crate::encoder::CodedTable;

/// One sequence per subject plus the shared alphabet.
///
/// `indexed[s][i]` is the alphabet index of `sequences[s][i]`; downstream
/// matrices are addressed by those indices.
#[derive(Debug, Clone)]
pub struct SequenceSet {
    sequences: Vec<Sequence>,
    indexed: Vec<Vec<usize>>,
    alphabet: Alphabet,
    feature_names: Vec<String>,
}

impl SequenceSet {
    /// Build a set directly from sequences, with numeric labels.
    pub fn from_sequences(sequences: Vec<Sequence>) -> Result<Self> {
        let alphabet = Alphabet::from_states(
            sequences
                .iter()
                .flat_map(|sequence| sequence.states().iter().copied()),
        );
        let length = sequences.first().map_or(0, Sequence::len);
        let feature_names = (1..=length).map(|i| format!("position_{i}")).collect();
        Self::assemble(sequences, alphabet, feature_names)
    }

    fn assemble(
        sequences: Vec<Sequence>,
        alphabet: Alphabet,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        let length = feature_names.len();
        let mut indexed = Vec::with_capacity(sequences.len());
        for (subject, sequence) in sequences.iter().enumerate() {
            if sequence.len() != length {
                return Err(ProfileError::data_integrity(
                    Stage::Sequence,
                    format!(
                        "subject {subject} has a sequence of length {}, expected {length}",
                        sequence.len()
                    ),
                ));
            }
            let mut row = Vec::with_capacity(length);
            for state in sequence.states() {
                let index = alphabet.index_of(*state).ok_or_else(|| {
                    ProfileError::data_integrity(
                        Stage::Sequence,
                        format!("subject {subject} uses state {state} outside the alphabet"),
                    )
                })?;
                row.push(index);
            }
            indexed.push(row);
        }
        Ok(Self {
            sequences,
            indexed,
            alphabet,
            feature_names,
        })
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn indexed(&self) -> &[Vec<usize>] {
        &self.indexed
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Number of subjects.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Shared sequence length (retained feature count).
    pub fn length(&self) -> usize {
        self.feature_names.len()
    }

    pub fn distinct_count(&self) -> usize {
        self.indexed.iter().collect::<HashSet<_>>().len()
    }
}

/// Concatenate each subject's codes in feature order.
pub fn build_sequences(table: &CodedTable) -> Result<SequenceSet> {
    let subject_count = table.subject_count();
    for (feature, column) in table.features().iter().zip(table.columns()) {
        if column.len() != subject_count {
            return Err(ProfileError::data_integrity(
                Stage::Sequence,
                format!(
                    "feature '{}' holds {} codes for {subject_count} subjects",
                    feature.name,
                    column.len()
                ),
            ));
        }
    }

    let mut sequences = Vec::with_capacity(subject_count);
    for subject in 0..subject_count {
        let mut states = Vec::with_capacity(table.features().len());
        for (feature, column) in table.features().iter().zip(table.columns()) {
            let state = column[subject].ok_or_else(|| {
                ProfileError::data_integrity(
                    Stage::Sequence,
                    format!(
                        "subject {subject} has no code for feature '{}'",
                        feature.name
                    ),
                )
            })?;
            states.push(state);
        }
        sequences.push(Sequence::new(states));
    }

    let alphabet = Alphabet::from_labeled(observed_states(table, &sequences));
    let feature_names = table
        .features()
        .iter()
        .map(|feature| feature.name.clone())
        .collect();
    let set = SequenceSet::assemble(sequences, alphabet, feature_names)?;
    info!(
        subject_count = set.len(),
        length = set.length(),
        alphabet_size = set.alphabet().len(),
        distinct_sequences = set.distinct_count(),
        "sequences built"
    );
    Ok(set)
}

fn observed_states(table: &CodedTable, sequences: &[Sequence]) -> Vec<(State, String)> {
    let mut observed = Vec::new();
    for sequence in sequences {
        for (position, state) in sequence.states().iter().enumerate() {
            let label = match table.state_space() {
                StateSpace::Shared => state.to_string(),
                StateSpace::FeatureScoped => {
                    let feature = &table.features()[position];
                    let value = feature.label_of(*state).unwrap_or("?");
                    format!("{}={value}", feature.name)
                }
            };
            observed.push((*state, label));
        }
    }
    observed
}
