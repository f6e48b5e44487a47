//! Data models for the report analysis.
//!
//! This module contains the core data structures passed between the
//! specialist stage, the team stage and the report generator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Output text of each completed task, keyed by task name.
pub type ResultMap = HashMap<String, String>;

/// A specialist role consulted during the first stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Specialist {
    Cardiologist,
    Psychologist,
    Pulmonologist,
}

impl Specialist {
    /// Every role, in the order the team reads their reports.
    pub const ALL: [Specialist; 3] = [
        Specialist::Cardiologist,
        Specialist::Psychologist,
        Specialist::Pulmonologist,
    ];

    /// Task name used as the key in a [`ResultMap`].
    pub fn name(&self) -> &'static str {
        match self {
            Specialist::Cardiologist => "Cardiologist",
            Specialist::Psychologist => "Psychologist",
            Specialist::Pulmonologist => "Pulmonologist",
        }
    }

    /// Returns an emoji representation of the specialty.
    pub fn emoji(&self) -> &'static str {
        match self {
            Specialist::Cardiologist => "🫀",
            Specialist::Psychologist => "🧠",
            Specialist::Pulmonologist => "🫁",
        }
    }
}

impl fmt::Display for Specialist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Input to the team stage: one report per known role.
///
/// Built by name lookup from a [`ResultMap`]. Roles with no entry hold an
/// empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedInput {
    reports: Vec<(String, String)>,
    missing: Vec<String>,
}

impl AggregatedInput {
    /// Look up every role in `results`, defaulting absent roles to "".
    pub fn from_results(roles: &[String], results: &ResultMap) -> Self {
        let mut reports = Vec::with_capacity(roles.len());
        let mut missing = Vec::new();

        for role in roles {
            match results.get(role) {
                Some(text) => reports.push((role.clone(), text.clone())),
                None => {
                    missing.push(role.clone());
                    reports.push((role.clone(), String::new()));
                }
            }
        }

        Self { reports, missing }
    }

    /// The report for `role`, or "" if the role is unknown.
    #[allow(dead_code)] // Lookup utility
    pub fn report(&self, role: &str) -> &str {
        self.reports
            .iter()
            .find(|(r, _)| r == role)
            .map(|(_, text)| text.as_str())
            .unwrap_or("")
    }

    /// Roles that had no entry in the results. A role that answered with
    /// empty text is not missing.
    pub fn missing_roles(&self) -> Vec<&str> {
        self.missing.iter().map(String::as_str).collect()
    }

    /// Render the team prompt body, one labelled section per role.
    pub fn to_prompt(&self) -> String {
        let mut prompt = String::new();

        for (role, text) in &self.reports {
            prompt.push_str(&format!("{} Report: {}\n\n", role, text));
        }

        prompt
    }
}

/// Metadata about a completed analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisMetadata {
    /// Where the medical report was read from.
    pub source: String,
    /// Date and time of the analysis.
    pub analysis_date: DateTime<Utc>,
    /// Name of the LLM model used.
    pub model_used: String,
    /// Number of specialists consulted.
    pub specialists_consulted: usize,
    /// Duration of the analysis in seconds.
    pub duration_seconds: f64,
}

/// The complete result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnosis {
    /// Metadata about the run.
    pub metadata: DiagnosisMetadata,
    /// The team's final text.
    pub final_diagnosis: String,
    /// Each specialist's report, keyed by task name.
    pub specialist_reports: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(entries: &[(&str, &str)]) -> ResultMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn roles() -> Vec<String> {
        Specialist::ALL.iter().map(|r| r.name().to_string()).collect()
    }

    #[test]
    fn test_specialist_names() {
        assert_eq!(Specialist::Cardiologist.name(), "Cardiologist");
        assert_eq!(Specialist::Pulmonologist.to_string(), "Pulmonologist");
        assert_eq!(Specialist::ALL.len(), 3);
    }

    #[test]
    fn test_aggregated_input_lookup() {
        let input = AggregatedInput::from_results(&roles(), &results(&[
            ("Cardiologist", "heart ok"),
            ("Psychologist", "mild anxiety"),
            ("Pulmonologist", "clear lungs"),
        ]));

        assert_eq!(input.report("Psychologist"), "mild anxiety");
        assert!(input.missing_roles().is_empty());

        let prompt = input.to_prompt();
        let cardio = prompt.find("Cardiologist Report: heart ok").unwrap();
        let psych = prompt.find("Psychologist Report: mild anxiety").unwrap();
        let pulmo = prompt.find("Pulmonologist Report: clear lungs").unwrap();
        assert!(cardio < psych && psych < pulmo);
    }

    #[test]
    fn test_aggregated_input_defaults_missing_role() {
        let input = AggregatedInput::from_results(&roles(), &results(&[
            ("Cardiologist", "heart ok"),
            ("Pulmonologist", "clear lungs"),
        ]));

        assert_eq!(input.report("Psychologist"), "");
        assert_eq!(input.missing_roles(), vec!["Psychologist"]);
        assert!(input.to_prompt().contains("Psychologist Report: \n"));
    }

    #[test]
    fn test_empty_report_is_not_missing() {
        let input = AggregatedInput::from_results(&roles(), &results(&[
            ("Cardiologist", "heart ok"),
            ("Psychologist", ""),
        ]));

        assert_eq!(input.report("Psychologist"), "");
        assert_eq!(input.missing_roles(), vec!["Pulmonologist"]);
    }

    #[test]
    fn test_aggregated_input_ignores_unknown_names() {
        let input = AggregatedInput::from_results(&roles(), &results(&[("Dermatologist", "rash")]));
        assert_eq!(input.missing_roles().len(), 3);
        assert!(!input.to_prompt().contains("rash"));
    }

    #[test]
    fn test_aggregated_input_custom_roles() {
        let roles = vec!["A".to_string(), "B".to_string()];
        let input = AggregatedInput::from_results(&roles, &results(&[("A", "x"), ("B", "y")]));
        assert_eq!(input.to_prompt(), "A Report: x\n\nB Report: y\n\n");
        assert_eq!(input.report("C"), "");
    }
}
