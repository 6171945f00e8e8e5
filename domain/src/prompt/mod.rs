//! Prompt construction
//!
//! Pure functions that turn the case record and the transcript into
//! (system, user) prompt pairs for the three consultation purposes:
//! opinion round, vote round, and final summary. All three share the same
//! case and transcript formatters, so every doctor argues from the same
//! rendering of the facts.

pub mod history;

pub use history::{Message, Role, format_history_for_provider};

use crate::case::PatientCase;
use crate::participant::Doctor;
use crate::transcript::{Transcript, TranscriptEntry};

/// Marker prepended to a doctor's own earlier statements so models do not
/// debate themselves as if they were a colleague
pub const OWN_STATEMENT_TAG: &str = "(your own statement) ";

/// A constructed (system, user) prompt pair
#[derive(Debug, Clone, PartialEq)]
pub struct ConsultPrompt {
    pub system: String,
    pub user: String,
}

/// Prompt for one doctor's opinion turn
pub fn build_opinion_prompt(
    system_prompt: &str,
    case: &PatientCase,
    transcript: &Transcript,
    self_id: Option<&str>,
) -> ConsultPrompt {
    let user = format!(
        "[Patient record]\n{}\n\n[Discussion and patient notes]\n{}\n\n\
         Based on the information above, give your professional analysis and recommendations.",
        format_case(case),
        transcript_text(transcript, case, self_id),
    );

    ConsultPrompt {
        system: system_prompt.to_string(),
        user,
    }
}

/// Prompt for one doctor's vote in the evaluation phase
///
/// The user message lists every doctor as `- name (ID: id)` and demands a
/// bare JSON object naming one of them; the system prompt repeats the
/// JSON-only instruction so chatty models stay on format.
pub fn build_vote_prompt(
    system_prompt: &str,
    case: &PatientCase,
    transcript: &Transcript,
    doctors: &[Doctor],
    voter: &Doctor,
) -> ConsultPrompt {
    let doctor_list = doctors
        .iter()
        .map(|d| format!("- {} (ID: {})", d.name, d.id))
        .collect::<Vec<_>>()
        .join("\n");

    let user = format!(
        "[Patient record]\n{}\n\n[Discussion and patient notes]\n{}\n\n[Doctor roster]\n{}\n\n\
         You are {} (ID: {}). You are now in the evaluation phase: name the one doctor whose \
         answer this round you judge least convincing (you may name yourself). Respond with \
         exactly one JSON object and no other text or markup, in the form \
         {{\"targetDoctorId\":\"<doctor id>\",\"reason\":\"<short reason>\"}}. \
         The targetDoctorId must be one of the IDs in the roster above.",
        format_case(case),
        transcript_text(transcript, case, None),
        doctor_list,
        voter.name,
        voter.id,
    );

    let system = format!(
        "{}\n\nImportant: you are only evaluating now. Output strictly the JSON object \
         {{\"targetDoctorId\":\"<doctor id>\",\"reason\":\"<short reason>\"}} and nothing else: \
         no explanations, no Markdown.",
        system_prompt
    );

    ConsultPrompt { system, user }
}

/// Prompt for the final consultation summary
pub fn build_summary_prompt(
    system_prompt: &str,
    case: &PatientCase,
    transcript: &Transcript,
) -> ConsultPrompt {
    let user = format!(
        "[Patient record]\n{}\n\n[Full consultation transcript]\n{}\n\n\
         Speaking as the attending clinician, give the final summary. Include at least:\n\
         1) Core diagnosis and grading (if uncertain, the most likely diagnosis with probability);\n\
         2) Key supporting evidence, as bullet points;\n\
         3) Differential diagnoses, ordered by likelihood;\n\
         4) Further workup, with the reason for each test;\n\
         5) Treatment and management recommendations (drug doses where applicable);\n\
         6) Follow-up plan and timing;\n\
         7) Patient education and risk warnings.",
        format_case(case),
        transcript_text(transcript, case, None),
    );

    ConsultPrompt {
        system: system_prompt.to_string(),
        user,
    }
}

/// Render the case block: present fields only, one per line
pub fn format_case(case: &PatientCase) -> String {
    let mut parts = Vec::new();
    if !case.name.trim().is_empty() {
        parts.push(format!("Name: {}", case.name));
    }
    if let Some(gender) = case.gender {
        parts.push(format!("Gender: {}", gender.label()));
    }
    if let Some(age) = case.age {
        parts.push(format!("Age: {}", age));
    }
    if !case.past_history.trim().is_empty() {
        parts.push(format!("Medical history: {}", case.past_history));
    }
    if !case.current_problem.trim().is_empty() {
        parts.push(format!("Chief complaint: {}", case.current_problem));
    }
    if !case.image_recognition_result.trim().is_empty() {
        parts.push(format!(
            "Image recognition finding: {}",
            case.image_recognition_result
        ));
    }
    parts.join("\n")
}

/// Render doctor/patient entries as `"<name>: <content>"` lines.
///
/// System and voting entries are not part of the conversation. When
/// `self_id` is given, that doctor's own lines carry [`OWN_STATEMENT_TAG`].
fn transcript_text(transcript: &Transcript, case: &PatientCase, self_id: Option<&str>) -> String {
    let lines: Vec<String> = transcript
        .entries()
        .iter()
        .filter_map(|entry| match entry {
            TranscriptEntry::Doctor {
                doctor_id,
                doctor_name,
                content,
            } => {
                let tag = match self_id {
                    Some(id) if id == doctor_id => OWN_STATEMENT_TAG,
                    _ => "",
                };
                Some(format!("{}: {}{}", doctor_name, tag, content))
            }
            TranscriptEntry::Patient { content, .. } => {
                Some(format!("{}: {}", case.patient_label(), content))
            }
            _ => None,
        })
        .collect();

    if lines.is_empty() {
        "(none yet)".to_string()
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::Gender;
    use crate::participant::ProviderKind;

    fn case() -> PatientCase {
        PatientCase {
            name: "Alice".to_string(),
            gender: Some(Gender::Female),
            age: Some(54),
            past_history: "hypertension".to_string(),
            current_problem: "persistent cough".to_string(),
            image_recognition_result: String::new(),
        }
    }

    fn transcript() -> Transcript {
        let mut t = Transcript::new();
        t.push(TranscriptEntry::system("Round 1 of the consultation begins"));
        t.push(TranscriptEntry::doctor("doc-1", "Dr. A", "Likely bronchitis."));
        t.push(TranscriptEntry::patient("Patient (Alice)", "The cough is worse at night."));
        t
    }

    #[test]
    fn test_format_case_skips_absent_fields() {
        let mut c = case();
        c.past_history = String::new();
        c.image_recognition_result = String::new();
        let text = format_case(&c);
        assert_eq!(
            text,
            "Name: Alice\nGender: Female\nAge: 54\nChief complaint: persistent cough"
        );
    }

    #[test]
    fn test_format_case_field_order() {
        let mut c = case();
        c.image_recognition_result = "nodule in the right lower lobe".to_string();
        let text = format_case(&c);
        let name_at = text.find("Name:").unwrap();
        let gender_at = text.find("Gender:").unwrap();
        let age_at = text.find("Age:").unwrap();
        let history_at = text.find("Medical history:").unwrap();
        let complaint_at = text.find("Chief complaint:").unwrap();
        let image_at = text.find("Image recognition finding:").unwrap();
        assert!(name_at < gender_at && gender_at < age_at);
        assert!(age_at < history_at && history_at < complaint_at && complaint_at < image_at);
    }

    #[test]
    fn test_opinion_prompt_includes_dialogue_but_not_system_entries() {
        let prompt = build_opinion_prompt("be thorough", &case(), &transcript(), None);
        assert_eq!(prompt.system, "be thorough");
        assert!(prompt.user.contains("Dr. A: Likely bronchitis."));
        assert!(prompt.user.contains("Patient (Alice): The cough is worse at night."));
        assert!(!prompt.user.contains("Round 1 of the consultation begins"));
    }

    #[test]
    fn test_opinion_prompt_tags_own_statements() {
        let prompt = build_opinion_prompt("sys", &case(), &transcript(), Some("doc-1"));
        assert!(prompt.user.contains("Dr. A: (your own statement) Likely bronchitis."));
    }

    #[test]
    fn test_empty_transcript_renders_placeholder() {
        let prompt = build_opinion_prompt("sys", &case(), &Transcript::new(), None);
        assert!(prompt.user.contains("(none yet)"));
    }

    #[test]
    fn test_vote_prompt_lists_doctors_and_demands_json() {
        let doctors = vec![
            Doctor::new("doc-1", "Dr. A", ProviderKind::OpenAi, "m"),
            Doctor::new("doc-2", "Dr. B", ProviderKind::Gemini, "m"),
        ];
        let prompt = build_vote_prompt("sys", &case(), &transcript(), &doctors, &doctors[1]);
        assert!(prompt.user.contains("- Dr. A (ID: doc-1)"));
        assert!(prompt.user.contains("- Dr. B (ID: doc-2)"));
        assert!(prompt.user.contains("You are Dr. B (ID: doc-2)"));
        assert!(prompt.user.contains(r#"{"targetDoctorId":"<doctor id>","reason":"<short reason>"}"#));
        assert!(prompt.system.contains("nothing else"));
        assert!(prompt.system.starts_with("sys"));
    }

    #[test]
    fn test_summary_prompt_carries_outline() {
        let prompt = build_summary_prompt("sys", &case(), &transcript());
        assert!(prompt.user.contains("Differential diagnoses"));
        assert!(prompt.user.contains("7) Patient education and risk warnings."));
        assert!(prompt.user.contains("Dr. A: Likely bronchitis."));
    }
}
