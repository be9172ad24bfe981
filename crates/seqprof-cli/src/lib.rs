//! Command-line front end for survey answer-profile clustering.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod progress;
pub mod summary;
pub mod types;
