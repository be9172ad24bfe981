//! Empirical transition rates between adjacent positions.

use tracing::{info, warn};

use seqprof_model::{Result, SquareMatrix, Stage};

use crate::builder::SequenceSet;

/// Row-normalized transition probabilities over the alphabet.
///
/// Rows of states never seen at a position followed by another position stay
/// all-zero; those states are reported in [`TransitionRates::low_support`].
#[derive(Debug, Clone)]
pub struct TransitionRates {
    rates: SquareMatrix,
    counts: Vec<u64>,
    row_totals: Vec<u64>,
    low_support: Vec<usize>,
}

impl TransitionRates {
    pub fn rates(&self) -> &SquareMatrix {
        &self.rates
    }

    pub fn dim(&self) -> usize {
        self.rates.dim()
    }

    /// `P(from → to)` by alphabet index.
    pub fn rate(&self, from: usize, to: usize) -> f64 {
        self.rates.get(from, to)
    }

    pub fn count(&self, from: usize, to: usize) -> u64 {
        self.counts[from * self.dim() + to]
    }

    pub fn row_total(&self, from: usize) -> u64 {
        self.row_totals[from]
    }

    /// Alphabet indices with no outgoing transitions.
    pub fn low_support(&self) -> &[usize] {
        &self.low_support
    }

    pub fn is_low_support(&self, index: usize) -> bool {
        self.row_totals[index] == 0
    }
}

/// Count `(s_i, s_{i+1})` over every sequence and normalize each row.
pub fn estimate_transition_rates(set: &SequenceSet) -> Result<TransitionRates> {
    let dim = set.alphabet().len();
    let mut counts = vec![0u64; dim * dim];
    for sequence in set.indexed() {
        for pair in sequence.windows(2) {
            counts[pair[0] * dim + pair[1]] += 1;
        }
    }

    let row_totals: Vec<u64> = counts
        .chunks(dim.max(1))
        .take(dim)
        .map(|row| row.iter().sum())
        .collect();

    let mut values = vec![0.0; dim * dim];
    for from in 0..dim {
        let total = row_totals[from];
        if total == 0 {
            continue;
        }
        for to in 0..dim {
            values[from * dim + to] = counts[from * dim + to] as f64 / total as f64;
        }
    }
    let rates = SquareMatrix::from_flat(Stage::Transition, dim, values)?;

    let low_support: Vec<usize> = (0..dim).filter(|&index| row_totals[index] == 0).collect();
    if !low_support.is_empty() {
        let labels: Vec<&str> = low_support
            .iter()
            .filter_map(|&index| set.alphabet().label(index))
            .collect();
        warn!(
            states = %labels.join(", "),
            "states without outgoing transitions get the maximal substitution cost"
        );
    }
    info!(
        alphabet_size = dim,
        transitions = row_totals.iter().sum::<u64>(),
        low_support = low_support.len(),
        "transition rates estimated"
    );

    Ok(TransitionRates {
        rates,
        counts,
        row_totals,
        low_support,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqprof_model::{Sequence, State};

    fn set(rows: &[&[u32]]) -> SequenceSet {
        SequenceSet::from_sequences(
            rows.iter()
                .map(|row| row.iter().map(|c| State::new(*c)).collect::<Sequence>())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn counts_are_directional() {
        let rates = estimate_transition_rates(&set(&[&[1, 2, 2], &[1, 2, 3]])).unwrap();
        // Alphabet {1, 2, 3} -> indices 0, 1, 2.
        assert_eq!(rates.count(0, 1), 2);
        assert_eq!(rates.count(1, 0), 0);
        assert_eq!(rates.count(1, 1), 1);
        assert_eq!(rates.count(1, 2), 1);
        assert!((rates.rate(1, 1) - 0.5).abs() < 1e-12);
        assert!((rates.rate(0, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rows_with_support_sum_to_one() {
        let rates = estimate_transition_rates(&set(&[&[1, 2, 1, 3], &[3, 3, 2, 1]])).unwrap();
        for from in 0..rates.dim() {
            let sum: f64 = rates.rates().row(from).iter().sum();
            if rates.is_low_support(from) {
                assert_eq!(sum, 0.0);
            } else {
                assert!((sum - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn terminal_only_state_is_low_support() {
        let rates = estimate_transition_rates(&set(&[&[1, 2], &[1, 3]])).unwrap();
        assert_eq!(rates.low_support(), &[1, 2]);
        assert!(rates.rates().row(1).iter().all(|v| *v == 0.0));
    }
}
