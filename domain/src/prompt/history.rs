//! Provider-shaped conversation history
//!
//! Providers consume the transcript as role-tagged chat messages: doctor
//! entries become assistant turns, patient entries become user turns, and
//! system entries are omitted entirely.

use crate::case::PatientCase;
use crate::prompt::OWN_STATEMENT_TAG;
use crate::transcript::{Transcript, TranscriptEntry};
use serde::{Deserialize, Serialize};

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A chat message handed to a provider adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Map the transcript to provider messages, in original order.
///
/// When `self_id` is given, that doctor's own lines carry
/// [`OWN_STATEMENT_TAG`] so the model can tell its prior statements from
/// its colleagues' inside the shared assistant role.
pub fn format_history_for_provider(
    transcript: &Transcript,
    case: &PatientCase,
    self_id: Option<&str>,
) -> Vec<Message> {
    transcript
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
                Some(Message::assistant(format!(
                    "{}: {}{}",
                    doctor_name, tag, content
                )))
            }
            TranscriptEntry::Patient { content, .. } => Some(Message::user(format!(
                "{}: {}",
                case.patient_label(),
                content
            ))),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case() -> PatientCase {
        PatientCase {
            name: "Alice".to_string(),
            current_problem: "cough".to_string(),
            ..Default::default()
        }
    }

    fn transcript() -> Transcript {
        let mut t = Transcript::new();
        t.push(TranscriptEntry::system("round starts"));
        t.push(TranscriptEntry::doctor("doc-1", "Dr. A", "first opinion"));
        t.push(TranscriptEntry::patient("Patient (Alice)", "a detail"));
        t.push(TranscriptEntry::doctor("doc-2", "Dr. B", "second opinion"));
        t.push(TranscriptEntry::vote_result("nobody eliminated"));
        t
    }

    #[test]
    fn test_roles_and_order() {
        let history = format_history_for_provider(&transcript(), &case(), None);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, Role::Assistant);
        assert_eq!(history[0].content, "Dr. A: first opinion");
        assert_eq!(history[1].role, Role::User);
        assert_eq!(history[1].content, "Patient (Alice): a detail");
        assert_eq!(history[2].role, Role::Assistant);
        assert_eq!(history[2].content, "Dr. B: second opinion");
    }

    #[test]
    fn test_system_and_vote_entries_are_omitted() {
        let history = format_history_for_provider(&transcript(), &case(), None);
        assert!(history.iter().all(|m| m.role != Role::System));
        assert!(!history.iter().any(|m| m.content.contains("round starts")));
        assert!(!history.iter().any(|m| m.content.contains("nobody eliminated")));
    }

    #[test]
    fn test_self_statements_are_tagged() {
        let history = format_history_for_provider(&transcript(), &case(), Some("doc-2"));
        assert_eq!(history[0].content, "Dr. A: first opinion");
        assert_eq!(history[2].content, "Dr. B: (your own statement) second opinion");
    }
}
