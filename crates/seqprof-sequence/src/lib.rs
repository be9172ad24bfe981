//! Sequence stages of the profiling pipeline.
//!
//! - [`encode_features`]: raw answers → integer codes per allow-listed feature
//! - [`build_sequences`]: coded table → one state sequence per subject
//! - [`estimate_transition_rates`]: adjacent-position transition probabilities
//! - [`substitution_costs`]: symmetric costs from transition rates

pub mod builder;
pub mod cost;
pub mod encoder;
pub mod transition;

pub use builder::{SequenceSet, build_sequences};
pub use cost::{SubstitutionCosts, substitution_costs};
pub use encoder::{CodedTable, DroppedFeature, FeatureCoding, encode_features};
pub use transition::{TransitionRates, estimate_transition_rates};
