//! Property tests for transition rates and substitution costs.

use proptest::prelude::*;

use seqprof_model::{CostMethod, Sequence, State};
use seqprof_sequence::{SequenceSet, estimate_transition_rates, substitution_costs};

fn corpus() -> impl Strategy<Value = Vec<Vec<u32>>> {
    (2usize..6).prop_flat_map(|length| {
        prop::collection::vec(prop::collection::vec(1u32..5, length), 1..12)
    })
}

fn sequence_set(rows: &[Vec<u32>]) -> SequenceSet {
    SequenceSet::from_sequences(
        rows.iter()
            .map(|row| row.iter().map(|c| State::new(*c)).collect::<Sequence>())
            .collect(),
    )
    .expect("equal-length corpus")
}

proptest! {
    #[test]
    fn supported_rows_sum_to_one(rows in corpus()) {
        let rates = estimate_transition_rates(&sequence_set(&rows)).unwrap();
        for from in 0..rates.dim() {
            let sum: f64 = rates.rates().row(from).iter().sum();
            if rates.row_total(from) > 0 {
                prop_assert!((sum - 1.0).abs() < 1e-9);
            } else {
                prop_assert_eq!(sum, 0.0);
            }
        }
    }

    #[test]
    fn costs_are_symmetric_non_negative_and_bounded(rows in corpus()) {
        let rates = estimate_transition_rates(&sequence_set(&rows)).unwrap();
        let costs = substitution_costs(&rates, CostMethod::TransitionRate).unwrap();
        for a in 0..costs.dim() {
            prop_assert_eq!(costs.get(a, a), 0.0);
            for b in 0..costs.dim() {
                let cost = costs.get(a, b);
                prop_assert!(cost.is_finite());
                prop_assert!(cost >= 0.0);
                prop_assert!(cost <= 2.0);
                prop_assert_eq!(cost, costs.get(b, a));
            }
        }
    }
}
