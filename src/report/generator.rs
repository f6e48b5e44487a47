//! Markdown and JSON rendering of a [`Diagnosis`].

use crate::models::{Diagnosis, DiagnosisMetadata, Specialist};
use anyhow::Result;
use std::collections::BTreeMap;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(diagnosis: &Diagnosis) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# MediVerse Report\n\n");

    output.push_str(&generate_metadata_section(&diagnosis.metadata));
    output.push_str(&generate_diagnosis_section(&diagnosis.final_diagnosis));
    output.push_str(&generate_specialist_section(&diagnosis.specialist_reports));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &DiagnosisMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Model Used:** `{}`\n", metadata.model_used));
    section.push_str(&format!(
        "- **Specialists Consulted:** {}\n",
        metadata.specialists_consulted
    ));
    section.push_str(&format!(
        "- **Analysis Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the final diagnosis section.
fn generate_diagnosis_section(final_diagnosis: &str) -> String {
    let mut section = String::new();

    section.push_str("## Final Diagnosis\n\n");
    section.push_str(final_diagnosis.trim());
    section.push_str("\n\n");

    section
}

/// Generate one subsection per specialist, in role order.
fn generate_specialist_section(reports: &BTreeMap<String, String>) -> String {
    if reports.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Specialist Reports\n\n");

    for (name, text) in ordered_reports(reports) {
        section.push_str(&format!("### {} {}\n\n", specialist_emoji(name), name));
        if text.trim().is_empty() {
            section.push_str("_No findings reported._\n\n");
        } else {
            section.push_str(text.trim());
            section.push_str("\n\n");
        }
    }

    section
}

/// Known roles first, in panel order, then anything else alphabetically.
fn ordered_reports(reports: &BTreeMap<String, String>) -> Vec<(&str, &str)> {
    let mut ordered: Vec<(&str, &str)> = Specialist::ALL
        .iter()
        .filter_map(|role| {
            reports
                .get_key_value(role.name())
                .map(|(k, v)| (k.as_str(), v.as_str()))
        })
        .collect();

    ordered.extend(
        reports
            .iter()
            .filter(|(k, _)| !Specialist::ALL.iter().any(|r| r.name() == k.as_str()))
            .map(|(k, v)| (k.as_str(), v.as_str())),
    );

    ordered
}

fn specialist_emoji(name: &str) -> &'static str {
    Specialist::ALL
        .iter()
        .find(|r| r.name() == name)
        .map(|r| r.emoji())
        .unwrap_or("🩺")
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(
        "*Generated by MediVerse. AI output is not medical advice; \
         consult a qualified clinician.*\n",
    );

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(diagnosis: &Diagnosis) -> Result<String> {
    serde_json::to_string_pretty(diagnosis).map_err(Into::into)
}
