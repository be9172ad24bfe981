//! Substitution costs derived from transition rates.
//!
//! `cost(a, b) = 2 - P(a→b) - P(b→a)` for `a != b`, `cost(a, a) = 0`.
//! Frequent mutual transitions mean a cheap substitution. Pairs involving a
//! state without outgoing transitions get the maximal cost of 2.

use tracing::info;

use seqprof_model::{CostMethod, MAX_SUBSTITUTION_COST, ProfileError, Result, SquareMatrix, Stage};

use crate::transition::TransitionRates;

const SYMMETRY_TOLERANCE: f64 = 1e-12;

/// Symmetric, non-negative cost table indexed by alphabet position.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionCosts {
    matrix: SquareMatrix,
}

impl SubstitutionCosts {
    /// Wrap a caller-provided cost table after checking it is symmetric,
    /// non-negative and zero on the diagonal.
    pub fn from_matrix(matrix: SquareMatrix) -> Result<Self> {
        matrix.ensure_dissimilarity(Stage::Substitution, SYMMETRY_TOLERANCE)?;
        if let Some(negative) = matrix.values().iter().find(|value| **value < 0.0) {
            return Err(ProfileError::data_integrity(
                Stage::Substitution,
                format!("substitution cost {negative} is negative"),
            ));
        }
        Ok(Self { matrix })
    }

    /// Every off-diagonal cost equal to `value`.
    pub fn constant(dim: usize, value: f64) -> Result<Self> {
        let mut matrix = SquareMatrix::zeros(dim);
        for a in 0..dim {
            for b in 0..dim {
                if a != b {
                    matrix.set(a, b, value);
                }
            }
        }
        Self::from_matrix(matrix)
    }

    pub fn matrix(&self) -> &SquareMatrix {
        &self.matrix
    }

    pub fn dim(&self) -> usize {
        self.matrix.dim()
    }

    #[inline]
    pub fn get(&self, a: usize, b: usize) -> f64 {
        self.matrix.get(a, b)
    }

    pub fn max_cost(&self) -> f64 {
        self.matrix.values().iter().copied().fold(0.0, f64::max)
    }

    /// True when `cost(a, c) <= cost(a, b) + cost(b, c)` for all states.
    pub fn is_metric(&self) -> bool {
        let dim = self.dim();
        for a in 0..dim {
            for b in 0..dim {
                for c in 0..dim {
                    if self.get(a, c) > self.get(a, b) + self.get(b, c) + SYMMETRY_TOLERANCE {
                        return false;
                    }
                }
            }
        }
        true
    }
}

/// Derive the substitution cost table for the chosen method.
pub fn substitution_costs(
    rates: &TransitionRates,
    method: CostMethod,
) -> Result<SubstitutionCosts> {
    let dim = rates.dim();
    let costs = match method {
        CostMethod::Constant => SubstitutionCosts::constant(dim, MAX_SUBSTITUTION_COST)?,
        CostMethod::TransitionRate => {
            let mut matrix = SquareMatrix::zeros(dim);
            for a in 0..dim {
                for b in (a + 1)..dim {
                    let cost = if rates.is_low_support(a) || rates.is_low_support(b) {
                        MAX_SUBSTITUTION_COST
                    } else {
                        (MAX_SUBSTITUTION_COST - rates.rate(a, b) - rates.rate(b, a)).max(0.0)
                    };
                    matrix.set(a, b, cost);
                    matrix.set(b, a, cost);
                }
            }
            SubstitutionCosts::from_matrix(matrix)?
        }
    };
    info!(
        method = method.as_str(),
        alphabet_size = dim,
        max_cost = costs.max_cost(),
        "substitution costs derived"
    );
    Ok(costs)
}
