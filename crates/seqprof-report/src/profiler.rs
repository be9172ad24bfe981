//! Association between cluster membership and study variables.
//!
//! For each variable a cluster × value contingency table is built from the
//! raw survey answers. Missing answers are counted per cluster but stay out
//! of the table. Clusters or values with no observations are left out of the
//! test, so expected counts are always positive.

use serde::Serialize;
use tracing::{debug, info};

use seqprof_cluster::ClusterAssignment;
use seqprof_ingest::SurveyFrame;
use seqprof_model::{ProfileError, Result, Stage, SurveySchema};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyTable {
    pub variable: String,
    /// Observed values, sorted.
    pub values: Vec<String>,
    /// `counts[cluster - 1][value]`.
    pub counts: Vec<Vec<u64>>,
    /// Missing answers per cluster.
    pub missing: Vec<u64>,
}

impl ContingencyTable {
    pub fn observed(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    pub fn cluster_total(&self, cluster: usize) -> u64 {
        self.counts
            .get(cluster.wrapping_sub(1))
            .map(|row| row.iter().sum())
            .unwrap_or(0)
    }

    pub fn value_total(&self, value: usize) -> u64 {
        self.counts.iter().map(|row| row[value]).sum()
    }
}

/// Pearson χ² test of independence with Cramér's V.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Association {
    pub chi_square: f64,
    pub degrees_of_freedom: usize,
    pub cramers_v: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableProfile {
    pub table: ContingencyTable,
    /// `None` when fewer than two clusters or two values were observed.
    pub association: Option<Association>,
}

pub struct ClusterProfiler<'a> {
    frame: &'a SurveyFrame,
    schema: &'a SurveySchema,
}

impl<'a> ClusterProfiler<'a> {
    pub fn new(frame: &'a SurveyFrame, schema: &'a SurveySchema) -> Self {
        Self { frame, schema }
    }

    pub fn profile(
        &self,
        assignment: &ClusterAssignment,
        variables: &[String],
    ) -> Result<Vec<VariableProfile>> {
        if assignment.subject_count() != self.frame.subject_count() {
            return Err(ProfileError::data_integrity(
                Stage::Profile,
                format!(
                    "assignment covers {} subjects, survey table has {}",
                    assignment.subject_count(),
                    self.frame.subject_count()
                ),
            ));
        }
        let profiles = variables
            .iter()
            .map(|variable| self.profile_variable(assignment, variable))
            .collect::<Result<Vec<_>>>()?;
        info!(
            variables = profiles.len(),
            clusters = assignment.k(),
            "cluster profiles computed"
        );
        Ok(profiles)
    }

    fn profile_variable(
        &self,
        assignment: &ClusterAssignment,
        variable: &str,
    ) -> Result<VariableProfile> {
        if !self.frame.has_column(variable) {
            return Err(ProfileError::configuration(
                Stage::Profile,
                format!("profile variable '{variable}' is not a column of the survey table"),
            ));
        }
        let answers = self
            .frame
            .text_column(variable)
            .map_err(|e| ProfileError::data_integrity(Stage::Profile, e.to_string()))?;

        let mut values: Vec<String> = answers
            .iter()
            .flatten()
            .filter(|value| !self.schema.is_missing(value))
            .cloned()
            .collect();
        values.sort();
        values.dedup();

        let k = assignment.k();
        let mut counts = vec![vec![0u64; values.len()]; k];
        let mut missing = vec![0u64; k];
        for (answer, &label) in answers.iter().zip(assignment.labels()) {
            match answer.as_deref().filter(|value| !self.schema.is_missing(value)) {
                Some(value) => {
                    if let Ok(index) = values.binary_search_by(|probe| probe.as_str().cmp(value)) {
                        counts[label - 1][index] += 1;
                    }
                }
                None => missing[label - 1] += 1,
            }
        }

        let table = ContingencyTable {
            variable: variable.to_string(),
            values,
            counts,
            missing,
        };
        let association = chi_square(&table.counts);
        debug!(
            variable,
            observed = table.observed(),
            chi_square = ?association.map(|a| a.chi_square),
            "variable profiled"
        );
        Ok(VariableProfile { table, association })
    }
}

/// χ² over the rows and columns with a positive total.
pub fn chi_square(counts: &[Vec<u64>]) -> Option<Association> {
    let columns = counts.first().map_or(0, Vec::len);
    let row_totals: Vec<u64> = counts.iter().map(|row| row.iter().sum()).collect();
    let column_totals: Vec<u64> = (0..columns)
        .map(|c| counts.iter().map(|row| row[c]).sum())
        .collect();
    let rows: Vec<usize> = (0..counts.len()).filter(|&r| row_totals[r] > 0).collect();
    let cols: Vec<usize> = (0..columns).filter(|&c| column_totals[c] > 0).collect();
    if rows.len() < 2 || cols.len() < 2 {
        return None;
    }

    let total = row_totals.iter().sum::<u64>() as f64;
    let mut statistic = 0.0;
    for &r in &rows {
        for &c in &cols {
            let expected = row_totals[r] as f64 * column_totals[c] as f64 / total;
            let delta = counts[r][c] as f64 - expected;
            statistic += delta * delta / expected;
        }
    }
    let smaller = rows.len().min(cols.len()) - 1;
    Some(Association {
        chi_square: statistic,
        degrees_of_freedom: (rows.len() - 1) * (cols.len() - 1),
        cramers_v: (statistic / (total * smaller as f64)).sqrt(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> SurveyFrame {
        SurveyFrame::from_columns(vec![
            (
                "sport",
                vec![Some("Yes"), Some("Yes"), Some("No"), Some("No"), Some("NA")],
            ),
            ("site", vec![Some("A"), Some("A"), Some("A"), Some("A"), Some("A")]),
        ])
        .unwrap()
    }

    #[test]
    fn perfect_association_has_unit_cramers_v() {
        let frame = frame();
        let schema = SurveySchema::default();
        let assignment = ClusterAssignment::new(vec![1, 1, 2, 2, 2], 2).unwrap();
        let profiles = ClusterProfiler::new(&frame, &schema)
            .profile(&assignment, &["sport".to_string()])
            .unwrap();
        let profile = &profiles[0];
        assert_eq!(profile.table.values, vec!["No", "Yes"]);
        assert_eq!(profile.table.counts, vec![vec![0, 2], vec![2, 0]]);
        assert_eq!(profile.table.missing, vec![0, 1]);
        let association = profile.association.unwrap();
        assert!((association.chi_square - 4.0).abs() < 1e-12);
        assert_eq!(association.degrees_of_freedom, 1);
        assert!((association.cramers_v - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_variable_has_no_association() {
        let frame = frame();
        let schema = SurveySchema::default();
        let assignment = ClusterAssignment::new(vec![1, 2, 1, 2, 1], 2).unwrap();
        let profiles = ClusterProfiler::new(&frame, &schema)
            .profile(&assignment, &["site".to_string()])
            .unwrap();
        assert!(profiles[0].association.is_none());
        assert_eq!(profiles[0].table.cluster_total(1), 3);
    }

    #[test]
    fn unknown_variable_is_a_configuration_error() {
        let frame = frame();
        let schema = SurveySchema::default();
        let assignment = ClusterAssignment::new(vec![1, 1, 2, 2, 2], 2).unwrap();
        let err = ClusterProfiler::new(&frame, &schema)
            .profile(&assignment, &["age".to_string()])
            .unwrap_err();
        assert!(matches!(err, ProfileError::Configuration { stage: Stage::Profile, .. }));
    }

    #[test]
    fn independent_table_has_zero_statistic() {
        let association = chi_square(&[vec![2, 4], vec![1, 2]]).unwrap();
        assert!(association.chi_square.abs() < 1e-12);
        assert_eq!(association.cramers_v, 0.0);
    }
}
