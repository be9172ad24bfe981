//! CSV loading with every column read as text.

use std::collections::BTreeSet;
use std::path::Path;

use polars::prelude::*;
use tracing::info;

use crate::error::{IngestError, Result};
use crate::frame::SurveyFrame;

/// Options for reading a survey export.
#[derive(Debug, Clone, Copy)]
pub struct SurveyReadOptions {
    /// Field separator byte.
    pub separator: u8,
}

impl Default for SurveyReadOptions {
    fn default() -> Self {
        Self { separator: b',' }
    }
}

impl SurveyReadOptions {
    #[must_use]
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }
}

/// Reads a survey CSV with default options.
pub fn read_survey_csv(path: &Path) -> Result<SurveyFrame> {
    read_survey_csv_with_options(path, SurveyReadOptions::default())
}

/// Reads a survey CSV into a [`SurveyFrame`].
///
/// Schema inference is disabled so every column arrives as text; typing is
/// decided by the study schema, never by the reader.
pub fn read_survey_csv_with_options(
    path: &Path,
    options: SurveyReadOptions,
) -> Result<SurveyFrame> {
    std::fs::metadata(path).map_err(|e| IngestError::io(path, e))?;

    let separator = options.separator;
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|parse| parse.with_separator(separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if df.height() == 0 {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let names = normalize_headers(&df, path)?;
    df.set_column_names(names)?;

    info!(
        path = %path.display(),
        subject_count = df.height(),
        column_count = df.width(),
        "survey table loaded"
    );
    Ok(SurveyFrame::new(df).with_source(path))
}

fn normalize_headers(df: &DataFrame, path: &Path) -> Result<Vec<String>> {
    let mut seen = BTreeSet::new();
    let mut names = Vec::with_capacity(df.width());
    for raw in df.get_column_names() {
        let name = raw.trim().trim_matches('\u{feff}').to_string();
        if !seen.insert(name.clone()) {
            return Err(IngestError::DuplicateColumn {
                column: name,
                path: path.to_path_buf(),
            });
        }
        names.push(name);
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_numeric_looking_columns_stay_text() {
        let file = create_temp_csv("id,fatigue\n001,1\n002,2\n");
        let frame = read_survey_csv(file.path()).unwrap();
        assert_eq!(frame.data().column("id").unwrap().dtype(), &DataType::String);
        assert_eq!(
            frame.text_column("id").unwrap(),
            vec![Some("001".to_string()), Some("002".to_string())]
        );
    }

    #[test]
    fn test_headers_are_trimmed() {
        let file = create_temp_csv(" sport ,fatigue\nYes,Low\n");
        let frame = read_survey_csv(file.path()).unwrap();
        assert_eq!(frame.column_names(), vec!["sport", "fatigue"]);
    }

    #[test]
    fn test_semicolon_separator() {
        let file = create_temp_csv("a;b\nx;y\n");
        let options = SurveyReadOptions::default().with_separator(b';');
        let frame = read_survey_csv_with_options(file.path(), options).unwrap();
        assert_eq!(frame.column_names(), vec!["a", "b"]);
        assert_eq!(frame.text_column("b").unwrap(), vec![Some("y".to_string())]);
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let file = create_temp_csv("a,b\n");
        let err = read_survey_csv(file.path()).unwrap_err();
        assert!(matches!(err, IngestError::EmptyCsv { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = read_survey_csv(Path::new("/nonexistent/survey.csv")).unwrap_err();
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }
}
