//! States, sequences and the global alphabet.
//!
//! A [`State`] is a small integer code for one answer value. Every subject
//! owns one [`Sequence`] of states, one symbol per retained survey feature,
//! and all sequences of a run share the same length. The [`Alphabet`] is the
//! sorted set of states observed across the whole corpus; matrices produced
//! by later stages are indexed by alphabet position rather than by raw code.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discrete code for one answer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(u32);

impl State {
    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    pub const fn code(self) -> u32 {
        self.0
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for State {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

/// Ordered states of one subject. Position `i` always holds the code of the
/// `i`-th retained feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Sequence {
    states: Vec<State>,
}

impl Sequence {
    pub fn new(states: Vec<State>) -> Self {
        Self { states }
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<State> {
        self.states.get(position).copied()
    }

    /// Adjacent `(from, to)` pairs in position order.
    pub fn transitions(&self) -> impl Iterator<Item = (State, State)> + '_ {
        self.states.windows(2).map(|pair| (pair[0], pair[1]))
    }
}

impl FromIterator<State> for Sequence {
    fn from_iter<I: IntoIterator<Item = State>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for state in &self.states {
            if !first {
                f.write_str("-")?;
            }
            write!(f, "{state}")?;
            first = false;
        }
        Ok(())
    }
}

/// Sorted set of distinct states with a display label per state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Alphabet {
    states: Vec<State>,
    labels: Vec<String>,
}

impl Alphabet {
    /// Build an alphabet from `(state, label)` pairs. Duplicate states keep the
    /// first label seen.
    pub fn from_labeled<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (State, String)>,
    {
        let mut entries: Vec<(State, String)> = entries.into_iter().collect();
        // Stable sort keeps the first label for duplicates at the front.
        entries.sort_by_key(|(state, _)| *state);
        entries.dedup_by_key(|(state, _)| *state);
        let (states, labels) = entries.into_iter().unzip();
        Self { states, labels }
    }

    /// Alphabet whose labels are the numeric codes themselves.
    pub fn from_states<I>(states: I) -> Self
    where
        I: IntoIterator<Item = State>,
    {
        Self::from_labeled(states.into_iter().map(|state| (state, state.to_string())))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn index_of(&self, state: State) -> Option<usize> {
        self.states.binary_search(&state).ok()
    }

    pub fn state(&self, index: usize) -> Option<State> {
        self.states.get(index).copied()
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_sorts_and_dedups() {
        let alphabet = Alphabet::from_labeled(vec![
            (State::new(3), "c".to_string()),
            (State::new(1), "a".to_string()),
            (State::new(3), "other".to_string()),
        ]);
        assert_eq!(alphabet.states(), &[State::new(1), State::new(3)]);
        assert_eq!(alphabet.label(1), Some("c"));
        assert_eq!(alphabet.index_of(State::new(3)), Some(1));
        assert_eq!(alphabet.index_of(State::new(2)), None);
    }

    #[test]
    fn sequence_transitions_follow_position_order() {
        let seq: Sequence = [1, 2, 2].into_iter().map(State::new).collect();
        let pairs: Vec<_> = seq.transitions().collect();
        assert_eq!(
            pairs,
            vec![
                (State::new(1), State::new(2)),
                (State::new(2), State::new(2))
            ]
        );
        assert_eq!(seq.to_string(), "1-2-2");
    }
}
