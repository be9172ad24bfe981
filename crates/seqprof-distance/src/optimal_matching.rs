//! Optimal Matching edit distance.
//!
//! `cell(i, j)` is the cheapest alignment of the first `i` symbols of `a`
//! with the first `j` symbols of `b`:
//!
//! ```text
//! cell(0, 0) = 0
//! cell(i, 0) = i * indel
//! cell(0, j) = j * indel
//! cell(i, j) = min(cell(i-1, j-1) + cost(a[i], b[j]),
//!                  cell(i-1, j) + indel,
//!                  cell(i, j-1) + indel)
//! ```
//!
//! The distance is `cell(n, m)`. Only two rows of the grid are kept alive.

use seqprof_model::{ProfileError, Result, Stage};
use seqprof_sequence::SubstitutionCosts;

#[derive(Debug, Clone, Copy)]
pub struct OptimalMatching<'a> {
    costs: &'a SubstitutionCosts,
    indel: f64,
}

impl<'a> OptimalMatching<'a> {
    pub fn new(costs: &'a SubstitutionCosts, indel: f64) -> Result<Self> {
        if !indel.is_finite() || indel < 0.0 {
            return Err(ProfileError::configuration(
                Stage::Distance,
                format!("indel cost must be a non-negative number, got {indel}"),
            ));
        }
        Ok(Self { costs, indel })
    }

    pub fn indel(&self) -> f64 {
        self.indel
    }

    pub fn costs(&self) -> &SubstitutionCosts {
        self.costs
    }

    /// Distance between two sequences of alphabet indices.
    pub fn distance(&self, a: &[usize], b: &[usize]) -> f64 {
        let mut previous: Vec<f64> = (0..=b.len()).map(|j| j as f64 * self.indel).collect();
        let mut current = vec![0.0; b.len() + 1];
        for (i, &sa) in a.iter().enumerate() {
            current[0] = (i + 1) as f64 * self.indel;
            for (j, &sb) in b.iter().enumerate() {
                let substitute = previous[j] + self.costs.get(sa, sb);
                let delete = previous[j + 1] + self.indel;
                let insert = current[j] + self.indel;
                current[j + 1] = substitute.min(delete).min(insert);
            }
            std::mem::swap(&mut previous, &mut current);
        }
        previous[b.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqprof_model::SquareMatrix;

    fn unit_costs(dim: usize) -> SubstitutionCosts {
        SubstitutionCosts::constant(dim, 1.0).unwrap()
    }

    #[test]
    fn identical_sequences_are_zero() {
        let costs = unit_costs(3);
        let om = OptimalMatching::new(&costs, 1.0).unwrap();
        assert_eq!(om.distance(&[0, 1, 2], &[0, 1, 2]), 0.0);
    }

    #[test]
    fn one_substitution_costs_its_table_entry() {
        let matrix = SquareMatrix::from_rows(
            Stage::Substitution,
            vec![vec![0.0, 0.4], vec![0.4, 0.0]],
        )
        .unwrap();
        let costs = SubstitutionCosts::from_matrix(matrix).unwrap();
        let om = OptimalMatching::new(&costs, 1.0).unwrap();
        assert!((om.distance(&[0, 0, 1], &[0, 1, 1]) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn indels_replace_expensive_substitutions() {
        // Substitution 2.0 vs delete+insert 2 * 0.5.
        let costs = SubstitutionCosts::constant(2, 2.0).unwrap();
        let om = OptimalMatching::new(&costs, 0.5).unwrap();
        assert!((om.distance(&[0, 1], &[1, 0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_sequence_costs_only_indels() {
        let costs = unit_costs(2);
        let om = OptimalMatching::new(&costs, 1.5).unwrap();
        assert!((om.distance(&[], &[0, 1]) - 3.0).abs() < 1e-12);
        assert!((om.distance(&[0, 1], &[]) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn negative_indel_is_rejected() {
        let costs = unit_costs(2);
        let err = OptimalMatching::new(&costs, -1.0).unwrap_err();
        assert!(matches!(err, ProfileError::Configuration { stage: Stage::Distance, .. }));
    }
}
