//! Metric properties of Optimal Matching dissimilarities.

use proptest::prelude::*;

use seqprof_distance::{DistanceOptions, OptimalMatching, compute_dissimilarities};
use seqprof_model::{Sequence, SquareMatrix, Stage, State};
use seqprof_sequence::{SequenceSet, SubstitutionCosts};

const ALPHABET: usize = 4;

/// Off-diagonal costs in [1, 2] always satisfy the triangle inequality.
fn metric_costs() -> impl Strategy<Value = SubstitutionCosts> {
    prop::collection::vec(1.0f64..=2.0, ALPHABET * (ALPHABET - 1) / 2).prop_map(|upper| {
        let mut matrix = SquareMatrix::zeros(ALPHABET);
        let mut values = upper.into_iter();
        for a in 0..ALPHABET {
            for b in (a + 1)..ALPHABET {
                let cost = values.next().unwrap();
                matrix.set(a, b, cost);
                matrix.set(b, a, cost);
            }
        }
        SubstitutionCosts::from_matrix(matrix).unwrap()
    })
}

fn corpus() -> impl Strategy<Value = Vec<Vec<u32>>> {
    (1usize..6).prop_flat_map(|length| {
        prop::collection::vec(prop::collection::vec(1u32..=ALPHABET as u32, length), 3..9)
    })
}

/// Every test sequence set contains the full alphabet, so alphabet index
/// `k` is always state `k + 1`.
fn sequence_set(rows: &[Vec<u32>]) -> SequenceSet {
    let mut sequences: Vec<Sequence> = rows
        .iter()
        .map(|row| row.iter().map(|c| State::new(*c)).collect())
        .collect();
    let length = rows[0].len();
    for code in 1..=ALPHABET as u32 {
        sequences.push(Sequence::new(vec![State::new(code); length]));
    }
    SequenceSet::from_sequences(sequences).unwrap()
}

fn options(indel_cost: f64) -> DistanceOptions {
    DistanceOptions {
        indel_cost,
        threads: 0,
    }
}

proptest! {
    #[test]
    fn dissimilarities_are_symmetric_with_zero_diagonal(
        rows in corpus(),
        costs in metric_costs(),
        indel in 0.5f64..2.0,
    ) {
        let set = sequence_set(&rows);
        let matrix = compute_dissimilarities(&set, &costs, options(indel)).unwrap();
        for a in 0..matrix.dim() {
            prop_assert_eq!(matrix.get(a, a), 0.0);
            for b in 0..matrix.dim() {
                prop_assert_eq!(matrix.get(a, b), matrix.get(b, a));
                prop_assert!(matrix.get(a, b) >= 0.0);
            }
        }
    }

    #[test]
    fn triangle_inequality_holds_for_metric_costs(
        rows in corpus(),
        costs in metric_costs(),
        indel in 0.5f64..2.0,
    ) {
        let set = sequence_set(&rows);
        let matrix = compute_dissimilarities(&set, &costs, options(indel)).unwrap();
        prop_assert_eq!(matrix.triangle_violations(1e-9), 0);
    }

    #[test]
    fn single_difference_costs_one_substitution(
        row in prop::collection::vec(0usize..ALPHABET, 1..8),
        position in any::<prop::sample::Index>(),
        replacement in 0usize..ALPHABET,
        costs in metric_costs(),
    ) {
        let position = position.index(row.len());
        let mut other = row.clone();
        other[position] = replacement;
        // indel 1 makes delete+insert (2) never cheaper than a substitution.
        let om = OptimalMatching::new(&costs, 1.0).unwrap();
        let expected = costs.get(row[position], replacement);
        prop_assert!((om.distance(&row, &other) - expected).abs() < 1e-12);
    }
}

#[test]
fn three_subject_scenario() {
    // [A,A], [A,B], [B,B] with cost(A,B) = 1 and indel 1.
    let set = SequenceSet::from_sequences(vec![
        Sequence::new(vec![State::new(1), State::new(1)]),
        Sequence::new(vec![State::new(1), State::new(2)]),
        Sequence::new(vec![State::new(2), State::new(2)]),
    ])
    .unwrap();
    let costs = SubstitutionCosts::constant(2, 1.0).unwrap();
    let matrix = compute_dissimilarities(&set, &costs, options(1.0)).unwrap();
    assert_eq!(matrix.get(0, 1), 1.0);
    assert_eq!(matrix.get(0, 2), 2.0);
    assert_eq!(matrix.get(1, 2), 1.0);
    assert_eq!(matrix.matrix().max_asymmetry(), 0.0);
}
