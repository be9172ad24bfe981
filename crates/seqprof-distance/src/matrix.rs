//! Pairwise dissimilarities between subjects.
//!
//! Identical sequences share one row: distances are computed between unique
//! sequences only and expanded back to subjects afterwards. Rows of the
//! unique upper triangle are spread over a `rayon` pool; every cell is
//! produced by exactly one task and written once, so the matrix is identical
//! for any thread count.

use std::collections::HashMap;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use seqprof_model::{ProfileError, Result, SquareMatrix, Stage};
use seqprof_sequence::{SequenceSet, SubstitutionCosts};

use crate::optimal_matching::OptimalMatching;

const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Symmetric subjects × subjects dissimilarities with a zero diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct DissimilarityMatrix {
    matrix: SquareMatrix,
}

impl DissimilarityMatrix {
    /// Wrap an externally computed matrix after checking it is square,
    /// symmetric, finite and zero on the diagonal.
    pub fn from_matrix(matrix: SquareMatrix) -> Result<Self> {
        matrix.ensure_dissimilarity(Stage::Distance, SYMMETRY_TOLERANCE)?;
        Ok(Self { matrix })
    }

    pub fn matrix(&self) -> &SquareMatrix {
        &self.matrix
    }

    /// Number of subjects.
    pub fn dim(&self) -> usize {
        self.matrix.dim()
    }

    #[inline]
    pub fn get(&self, a: usize, b: usize) -> f64 {
        self.matrix.get(a, b)
    }

    /// Number of triples `(i, j, k)` with `i < k` and
    /// `d(i, k) > d(i, j) + d(j, k)`.
    pub fn triangle_violations(&self, tolerance: f64) -> usize {
        let n = self.dim();
        let mut violations = 0;
        for i in 0..n {
            for k in (i + 1)..n {
                let direct = self.get(i, k);
                violations += (0..n)
                    .filter(|&j| j != i && j != k)
                    .filter(|&j| direct > self.get(i, j) + self.get(j, k) + tolerance)
                    .count();
            }
        }
        violations
    }
}

/// Options for [`compute_dissimilarities`].
#[derive(Debug, Clone, Copy)]
pub struct DistanceOptions {
    pub indel_cost: f64,
    /// Worker threads (0 = rayon default).
    pub threads: usize,
}

/// Receives the number of finished unique-sequence rows as work progresses.
pub trait DistanceProgress: Sync {
    fn start(&self, _rows: usize) {}
    fn advance(&self, rows: usize);
    fn finish(&self) {}
}

impl<F> DistanceProgress for F
where
    F: Fn(usize) + Sync,
{
    fn advance(&self, rows: usize) {
        self(rows);
    }
}

struct NoProgress;

impl DistanceProgress for NoProgress {
    fn advance(&self, _rows: usize) {}
}

/// Optimal Matching dissimilarities for every pair of subjects.
pub fn compute_dissimilarities(
    set: &SequenceSet,
    costs: &SubstitutionCosts,
    options: DistanceOptions,
) -> Result<DissimilarityMatrix> {
    compute_dissimilarities_with_progress(set, costs, options, &NoProgress)
}

pub fn compute_dissimilarities_with_progress(
    set: &SequenceSet,
    costs: &SubstitutionCosts,
    options: DistanceOptions,
    progress: &dyn DistanceProgress,
) -> Result<DissimilarityMatrix> {
    let om = OptimalMatching::new(costs, options.indel_cost)?;
    if costs.dim() < set.alphabet().len() {
        return Err(ProfileError::data_integrity(
            Stage::Distance,
            format!(
                "substitution table covers {} states, alphabet has {}",
                costs.dim(),
                set.alphabet().len()
            ),
        ));
    }

    let (unique, subject_to_unique) = deduplicate(set.indexed());
    if unique.len() < 2 {
        return Err(ProfileError::degenerate(
            Stage::Distance,
            format!(
                "{} subject(s) share fewer than 2 distinct sequences",
                set.len()
            ),
        ));
    }
    debug!(
        subject_count = set.len(),
        unique_sequences = unique.len(),
        "sequences deduplicated"
    );

    let started = Instant::now();
    progress.start(unique.len());
    let rows = run_in_pool(options.threads, || unique_upper_triangle(&om, &unique, progress))?;
    progress.finish();

    let u = unique.len();
    let mut unique_matrix = SquareMatrix::zeros(u);
    for (i, row) in rows.into_iter().enumerate() {
        for (offset, value) in row.into_iter().enumerate() {
            let j = i + 1 + offset;
            unique_matrix.set(i, j, value);
            unique_matrix.set(j, i, value);
        }
    }

    let n = set.len();
    let mut matrix = SquareMatrix::zeros(n);
    for a in 0..n {
        for b in 0..n {
            matrix.set(a, b, unique_matrix.get(subject_to_unique[a], subject_to_unique[b]));
        }
    }

    info!(
        subject_count = n,
        unique_sequences = u,
        pair_count = u * (u - 1) / 2,
        indel_cost = options.indel_cost,
        duration_ms = started.elapsed().as_millis(),
        "dissimilarity matrix computed"
    );
    DissimilarityMatrix::from_matrix(matrix)
}

/// Unique sequences in order of first appearance, plus the unique index of
/// every subject.
fn deduplicate(indexed: &[Vec<usize>]) -> (Vec<&[usize]>, Vec<usize>) {
    let mut positions: HashMap<&[usize], usize> = HashMap::new();
    let mut unique: Vec<&[usize]> = Vec::new();
    let mut subject_to_unique = Vec::with_capacity(indexed.len());
    for sequence in indexed {
        let index = *positions.entry(sequence.as_slice()).or_insert_with(|| {
            unique.push(sequence.as_slice());
            unique.len() - 1
        });
        subject_to_unique.push(index);
    }
    (unique, subject_to_unique)
}

/// Row `i` holds `d(i, j)` for `j > i`.
fn unique_upper_triangle(
    om: &OptimalMatching<'_>,
    unique: &[&[usize]],
    progress: &dyn DistanceProgress,
) -> Vec<Vec<f64>> {
    (0..unique.len())
        .into_par_iter()
        .map(|i| {
            let row = unique[(i + 1)..]
                .iter()
                .map(|other| om.distance(unique[i], other))
                .collect();
            progress.advance(1);
            row
        })
        .collect()
}

fn run_in_pool<T, F>(threads: usize, work: F) -> Result<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    if threads == 0 {
        return Ok(work());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| {
            ProfileError::configuration(
                Stage::Distance,
                format!("cannot start {threads} worker threads: {e}"),
            )
        })?;
    Ok(pool.install(work))
}
