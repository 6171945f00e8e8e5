//! Consultation participants
//!
//! A [`Doctor`] is one configured AI-backed opinion source. Doctors are
//! created from configuration before a consultation starts; `status` and
//! `votes` belong to the running consultation and are reset by the engine
//! on start. Elimination is terminal within a consultation.

use crate::core::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported AI provider families
///
/// Dispatch over providers is a closed set: an unrecognized identifier is
/// rejected at parse time rather than silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Gemini,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Gemini => "gemini",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "gemini" => Ok(ProviderKind::Gemini),
            other => Err(DomainError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Whether a doctor is still seated at the consultation table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoctorStatus {
    Active,
    Eliminated,
}

/// One AI-backed doctor in the consultation (Entity)
///
/// # Example
///
/// ```
/// use consilium_domain::participant::{Doctor, ProviderKind};
///
/// let doctor = Doctor::new("doc-1", "Dr. GPT-4", ProviderKind::OpenAi, "gpt-4o-mini");
/// assert!(doctor.is_active());
/// assert!(!doctor.has_credential());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub provider: ProviderKind,
    pub model: String,
    /// API key; empty means simulated mode for this doctor
    #[serde(default)]
    pub api_key: String,
    /// Base URL override; empty means the provider's public default
    #[serde(default)]
    pub base_url: String,
    /// Per-doctor system prompt; empty means use the global one
    #[serde(default)]
    pub custom_prompt: String,
    pub status: DoctorStatus,
    pub votes: u32,
}

impl Doctor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        provider: ProviderKind,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            provider,
            model: model.into(),
            api_key: String::new(),
            base_url: String::new(),
            custom_prompt: String::new(),
            status: DoctorStatus::Active,
            votes: 0,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_custom_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_prompt = prompt.into();
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == DoctorStatus::Active
    }

    /// Whether this doctor has a real credential, or runs in simulated mode
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Eliminated is terminal for the rest of the consultation
    pub fn eliminate(&mut self) {
        self.status = DoctorStatus::Eliminated;
    }

    /// Restore the participant to the state a fresh consultation expects
    pub fn reset_for_consultation(&mut self) {
        self.status = DoctorStatus::Active;
        self.votes = 0;
    }

    /// Effective system prompt: the doctor's own, falling back to the global
    pub fn system_prompt<'a>(&'a self, global: &'a str) -> &'a str {
        if self.custom_prompt.trim().is_empty() {
            global
        } else {
            &self.custom_prompt
        }
    }
}

/// Ids of all active doctors, in roster order
pub fn active_ids(doctors: &[Doctor]) -> Vec<String> {
    doctors
        .iter()
        .filter(|d| d.is_active())
        .map(|d| d.id.clone())
        .collect()
}
