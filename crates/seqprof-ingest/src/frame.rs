//! Immutable survey frame passed between pipeline stages.

use std::path::{Path, PathBuf};

use polars::prelude::*;

use crate::error::{IngestError, Result};

/// Subjects × raw answers, every column held as text.
///
/// Subjects are identified by row position. The frame is never mutated once
/// loaded; stages borrow it read-only.
#[derive(Debug, Clone)]
pub struct SurveyFrame {
    data: DataFrame,
    source: Option<PathBuf>,
}

impl SurveyFrame {
    pub fn new(data: DataFrame) -> Self {
        Self { data, source: None }
    }

    /// Build a frame from named text columns (mostly useful in tests).
    pub fn from_columns(columns: Vec<(&str, Vec<Option<&str>>)>) -> Result<Self> {
        let columns: Vec<Column> = columns
            .into_iter()
            .map(|(name, values)| Column::new(name.into(), values))
            .collect();
        Ok(Self::new(DataFrame::new(columns)?))
    }

    #[must_use]
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn subject_count(&self) -> usize {
        self.data.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .map(ToString::to_string)
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.data.column(name).is_ok()
    }

    /// Trimmed text values of one column, `None` for nulls.
    pub fn text_column(&self, name: &str) -> Result<Vec<Option<String>>> {
        let column = self
            .data
            .column(name)
            .map_err(|_| IngestError::ColumnNotFound {
                column: name.to_string(),
            })?;
        let str_col = column.cast(&DataType::String)?;
        let str_chunked = str_col.str()?;
        Ok(str_chunked
            .iter()
            .map(|value| value.map(|v| v.trim().to_string()))
            .collect())
    }
}
