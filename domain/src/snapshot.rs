//! Persisted consultation state
//!
//! The unit of save/restore/export. Collaborators treat it as a read-only
//! snapshot; only the engine mutates the live state it is taken from.

use crate::case::PatientCase;
use crate::participant::Doctor;
use crate::settings::ConsultationSettings;
use crate::summary::FinalSummary;
use crate::transcript::Transcript;
use crate::voting::VoteRecord;
use crate::workflow::WorkflowState;
use serde::{Deserialize, Serialize};

/// Full state of one consultation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsultationSnapshot {
    #[serde(default)]
    pub settings: ConsultationSettings,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub patient_case: PatientCase,
    #[serde(default)]
    pub workflow: WorkflowState,
    #[serde(default)]
    pub transcript: Transcript,
    #[serde(default)]
    pub last_round_votes: Vec<VoteRecord>,
    #[serde(default)]
    pub final_summary: FinalSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::ProviderKind;
    use crate::transcript::TranscriptEntry;

    #[test]
    fn test_snapshot_json_round_trip() {
        let mut snapshot = ConsultationSnapshot::default();
        snapshot
            .doctors
            .push(Doctor::new("doc-1", "Dr. A", ProviderKind::Anthropic, "claude-3-haiku"));
        snapshot.patient_case.name = "Alice".to_string();
        snapshot
            .transcript
            .push(TranscriptEntry::doctor("doc-1", "Dr. A", "hello"));

        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: ConsultationSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn test_snapshot_tolerates_missing_sections() {
        let restored: ConsultationSnapshot = serde_json::from_str("{}").unwrap();
        assert!(restored.doctors.is_empty());
        assert!(restored.transcript.is_empty());
    }
}
