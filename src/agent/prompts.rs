//! Prompt text for the specialists and the team.

use crate::models::Specialist;

/// Instructions for a single specialist reading the raw medical report.
pub fn specialist_instructions(role: Specialist) -> &'static str {
    match role {
        Specialist::Cardiologist => CARDIOLOGIST_PROMPT,
        Specialist::Psychologist => PSYCHOLOGIST_PROMPT,
        Specialist::Pulmonologist => PULMONOLOGIST_PROMPT,
    }
}

/// Wrap `report` in a role's instructions.
pub fn specialist_prompt(instructions: &str, report: &str) -> String {
    format!("{}\n\nMedical Report: {}", instructions.trim_end(), report)
}

/// Wrap the combined specialist reports in the team's instructions.
pub fn team_prompt(instructions: &str, reports: &str) -> String {
    format!("{}\n\n{}", instructions.trim_end(), reports.trim_end())
}

const CARDIOLOGIST_PROMPT: &str = r#"Act like a cardiologist. You will receive a medical report of a patient.
Task: Review the patient's cardiac workup, including ECG, blood tests, Holter monitor results and echocardiogram.
Focus: Determine if there are any subtle signs of cardiac issues that could explain the patient's symptoms. Rule out any underlying heart conditions that might have been missed on routine testing.
Recommendation: Provide guidance on further cardiac testing or monitoring needed, and suggest management strategies if a cardiac issue is identified.
Please only return the possible causes of the patient's symptoms and the recommended next steps."#;

const PSYCHOLOGIST_PROMPT: &str = r#"Act like a psychologist. You will receive a patient's report.
Task: Review the patient's report and provide a psychological assessment.
Focus: Identify any potential mental health issues, such as anxiety, depression or trauma, that may be affecting the patient's well-being.
Recommendation: Offer guidance on how to address these mental health concerns, including therapy, counseling or other interventions.
Please only return the possible mental health issues and the recommended next steps."#;

const PULMONOLOGIST_PROMPT: &str = r#"Act like a pulmonologist. You will receive a patient's report.
Task: Review the patient's report and provide a pulmonary assessment.
Focus: Identify any potential respiratory issues, such as asthma, COPD or lung infections, that may be affecting the patient's breathing.
Recommendation: Offer guidance on how to address these respiratory concerns, including pulmonary function tests, imaging studies or other interventions.
Please only return the possible respiratory issues and the recommended next steps."#;

/// Instructions for the multidisciplinary team.
pub const TEAM_PROMPT: &str = r#"Act like a multidisciplinary team of healthcare professionals.
You will receive a medical report of a patient reviewed by a cardiologist, a psychologist and a pulmonologist.
Task: Review the patient's medical report from the cardiologist, psychologist and pulmonologist, analyze them and come up with a list of 3 possible health issues of the patient.
Return a list of bullet points of 3 possible health issues of the patient and for each issue provide the reason."#;
