//! Optimal Matching dissimilarities.
//!
//! [`OptimalMatching`] aligns two equal-alphabet sequences with a
//! substitution table and a fixed indel cost; [`compute_dissimilarities`]
//! fills the subjects × subjects matrix in parallel.

pub mod matrix;
pub mod optimal_matching;

pub use matrix::{
    DissimilarityMatrix, DistanceOptions, DistanceProgress, compute_dissimilarities,
    compute_dissimilarities_with_progress,
};
pub use optimal_matching::OptimalMatching;
