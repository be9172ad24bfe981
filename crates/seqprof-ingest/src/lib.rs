//! Survey ingestion.
//!
//! Loads survey exports into an immutable [`SurveyFrame`] and reads the
//! study configuration (schema, analysis options, profile variables).
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use seqprof_ingest::{load_study_config, read_survey_csv};
//!
//! let config = load_study_config(Path::new("study.toml"))?;
//! let frame = read_survey_csv(Path::new("survey.csv"))?;
//! ```

mod config;
mod csv;
mod error;
mod frame;
mod hints;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use csv::{SurveyReadOptions, read_survey_csv, read_survey_csv_with_options};

// === Frame ===
pub use frame::SurveyFrame;

// === Configuration ===
pub use config::{ProfileSettings, StudyConfig, load_study_config, parse_study_config};

// === Column Hints ===
pub use hints::{ColumnHint, build_column_hints};
