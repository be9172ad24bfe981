//! Column hints for schema review.

use std::collections::{BTreeMap, BTreeSet};

use seqprof_model::SurveySchema;

use crate::error::Result;
use crate::frame::SurveyFrame;

/// Cardinality and missingness of one survey column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnHint {
    pub missing_count: usize,
    pub distinct_values: BTreeSet<String>,
    /// Share of non-missing values that parse as numbers.
    pub numeric_ratio: f64,
}

impl ColumnHint {
    pub fn distinct_count(&self) -> usize {
        self.distinct_values.len()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_count == 0
    }
}

/// Builds column hints for every column of the frame, using the schema's
/// missing markers.
pub fn build_column_hints(
    frame: &SurveyFrame,
    schema: &SurveySchema,
) -> Result<BTreeMap<String, ColumnHint>> {
    let mut hints = BTreeMap::new();
    for name in frame.column_names() {
        let values = frame.text_column(&name)?;
        hints.insert(name, analyze_values(&values, schema));
    }
    Ok(hints)
}

fn analyze_values(values: &[Option<String>], schema: &SurveySchema) -> ColumnHint {
    let mut missing_count = 0usize;
    let mut numeric_count = 0usize;
    let mut distinct_values = BTreeSet::new();
    for value in values {
        match value {
            Some(v) if !schema.is_missing(v) => {
                if v.parse::<f64>().is_ok() {
                    numeric_count += 1;
                }
                distinct_values.insert(v.clone());
            }
            _ => missing_count += 1,
        }
    }
    let present = values.len() - missing_count;
    let numeric_ratio = if present > 0 {
        numeric_count as f64 / present as f64
    } else {
        0.0
    };
    ColumnHint {
        missing_count,
        distinct_values,
        numeric_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_with_missing_markers() {
        let frame = SurveyFrame::from_columns(vec![
            ("fatigue", vec![Some("Low"), None, Some("NA"), Some("High"), Some("Low")]),
            ("age", vec![Some("31"), Some("45"), Some("52"), Some("x"), Some("29")]),
        ])
        .unwrap();
        let hints = build_column_hints(&frame, &SurveySchema::default()).unwrap();

        let fatigue = hints.get("fatigue").unwrap();
        assert_eq!(fatigue.missing_count, 2);
        assert_eq!(fatigue.distinct_count(), 2);
        assert!(!fatigue.is_complete());

        let age = hints.get("age").unwrap();
        assert!(age.is_complete());
        assert!((age.numeric_ratio - 0.8).abs() < 1e-9);
    }
}
