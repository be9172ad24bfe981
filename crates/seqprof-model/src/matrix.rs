//! Dense square matrix shared by the transition, cost and dissimilarity stages.

use serde::Serialize;

use crate::error::{ProfileError, Result, Stage};

/// Row-major `dim × dim` matrix of `f64`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquareMatrix {
    dim: usize,
    values: Vec<f64>,
}

impl SquareMatrix {
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            values: vec![0.0; dim * dim],
        }
    }

    /// Build from nested rows, rejecting ragged or non-square input.
    pub fn from_rows(stage: Stage, rows: Vec<Vec<f64>>) -> Result<Self> {
        let dim = rows.len();
        let mut values = Vec::with_capacity(dim * dim);
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(ProfileError::data_integrity(
                    stage,
                    format!(
                        "matrix is not square: row {index} has {} columns, expected {dim}",
                        row.len()
                    ),
                ));
            }
            values.extend(row);
        }
        Ok(Self { dim, values })
    }

    /// Build from a flat row-major buffer.
    pub fn from_flat(stage: Stage, dim: usize, values: Vec<f64>) -> Result<Self> {
        if values.len() != dim * dim {
            return Err(ProfileError::data_integrity(
                stage,
                format!(
                    "matrix buffer holds {} values, expected {}",
                    values.len(),
                    dim * dim
                ),
            ));
        }
        Ok(Self { dim, values })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.dim + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.values[row * self.dim + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.dim;
        &self.values[start..start + self.dim]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.dim.max(1)).take(self.dim)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Largest `|m[i][j] - m[j][i]|` over all pairs.
    pub fn max_asymmetry(&self) -> f64 {
        let mut worst = 0.0f64;
        for i in 0..self.dim {
            for j in (i + 1)..self.dim {
                worst = worst.max((self.get(i, j) - self.get(j, i)).abs());
            }
        }
        worst
    }

    /// Fails unless the matrix is symmetric within `tolerance` and has a zero
    /// diagonal.
    pub fn ensure_dissimilarity(&self, stage: Stage, tolerance: f64) -> Result<()> {
        let asymmetry = self.max_asymmetry();
        if asymmetry > tolerance {
            return Err(ProfileError::data_integrity(
                stage,
                format!("matrix is not symmetric (max deviation {asymmetry})"),
            ));
        }
        for i in 0..self.dim {
            let diagonal = self.get(i, i);
            if diagonal.abs() > tolerance {
                return Err(ProfileError::data_integrity(
                    stage,
                    format!("matrix diagonal at {i} is {diagonal}, expected 0"),
                ));
            }
        }
        if let Some(bad) = self.values.iter().find(|value| !value.is_finite()) {
            return Err(ProfileError::data_integrity(
                stage,
                format!("matrix holds a non-finite value ({bad})"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_rejects_ragged_input() {
        let err = SquareMatrix::from_rows(Stage::Cluster, vec![vec![0.0, 1.0], vec![1.0]])
            .unwrap_err();
        assert!(matches!(err, ProfileError::DataIntegrity { stage: Stage::Cluster, .. }));
    }

    #[test]
    fn dissimilarity_check_catches_asymmetry() {
        let matrix =
            SquareMatrix::from_rows(Stage::Cluster, vec![vec![0.0, 1.0], vec![2.0, 0.0]]).unwrap();
        assert!((matrix.max_asymmetry() - 1.0).abs() < 1e-12);
        assert!(matrix.ensure_dissimilarity(Stage::Cluster, 1e-9).is_err());
    }

    #[test]
    fn rows_iterates_each_row() {
        let matrix =
            SquareMatrix::from_rows(Stage::Cluster, vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        let rows: Vec<&[f64]> = matrix.rows().collect();
        assert_eq!(rows, vec![&[0.0, 1.0][..], &[1.0, 0.0][..]]);
        assert!(matrix.ensure_dissimilarity(Stage::Cluster, 1e-9).is_ok());
    }
}
