//! Patient case record
//!
//! Immutable during a round except through explicit patient-message or
//! image-result updates. The prompt builder reads it; nothing else writes it.

use crate::core::DomainError;
use serde::{Deserialize, Serialize};

/// Patient gender, mapped to a display label when formatting the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

/// The case under consultation (Entity)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientCase {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub past_history: String,
    #[serde(default)]
    pub current_problem: String,
    #[serde(default)]
    pub image_recognition_result: String,
}

impl PatientCase {
    /// A consultation needs at minimum a name and a chief complaint
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidCase(
                "patient name is required".to_string(),
            ));
        }
        if self.current_problem.trim().is_empty() {
            return Err(DomainError::InvalidCase(
                "chief complaint is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Display name used for patient-authored transcript lines
    pub fn patient_label(&self) -> String {
        if self.name.trim().is_empty() {
            "Patient".to_string()
        } else {
            format!("Patient ({})", self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_case() -> PatientCase {
        PatientCase {
            name: "Alice".to_string(),
            current_problem: "persistent cough".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_accepts_minimal_case() {
        assert!(valid_case().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_name() {
        let mut case = valid_case();
        case.name = "  ".to_string();
        let err = case.validate().unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_validate_requires_chief_complaint() {
        let mut case = valid_case();
        case.current_problem = String::new();
        let err = case.validate().unwrap_err();
        assert!(err.to_string().contains("chief complaint"));
    }

    #[test]
    fn test_patient_label() {
        assert_eq!(valid_case().patient_label(), "Patient (Alice)");
        assert_eq!(PatientCase::default().patient_label(), "Patient");
    }
}
