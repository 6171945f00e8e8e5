//! Final consultation summary
//!
//! One summary object per consultation; regenerating overwrites it. The
//! `pending` state is observable before the provider call resolves.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStatus {
    #[default]
    Idle,
    Pending,
    Ready,
    Error,
}

/// Final-summary state (Entity)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalSummary {
    pub status: SummaryStatus,
    pub doctor_id: Option<String>,
    pub doctor_name: String,
    pub content: String,
    pub used_prompt: String,
}

impl FinalSummary {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Summary generation has started for the chosen summarizer
    pub fn begin(
        doctor_id: impl Into<String>,
        doctor_name: impl Into<String>,
        used_prompt: impl Into<String>,
    ) -> Self {
        Self {
            status: SummaryStatus::Pending,
            doctor_id: Some(doctor_id.into()),
            doctor_name: doctor_name.into(),
            content: String::new(),
            used_prompt: used_prompt.into(),
        }
    }

    pub fn mark_ready(&mut self, content: impl Into<String>) {
        self.status = SummaryStatus::Ready;
        self.content = content.into();
    }

    /// Record a generation failure, keeping the chosen summarizer
    pub fn mark_error(&mut self, message: impl Into<String>) {
        self.status = SummaryStatus::Error;
        self.content = format!("Failed to generate the summary: {}", message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut summary = FinalSummary::begin("doc-1", "Dr. A", "summarize please");
        assert_eq!(summary.status, SummaryStatus::Pending);
        assert_eq!(summary.doctor_id.as_deref(), Some("doc-1"));

        summary.mark_ready("diagnosis: ...");
        assert_eq!(summary.status, SummaryStatus::Ready);
        assert_eq!(summary.content, "diagnosis: ...");
    }

    #[test]
    fn test_error_preserves_summarizer() {
        let mut summary = FinalSummary::begin("doc-1", "Dr. A", "prompt");
        summary.mark_error("timeout");
        assert_eq!(summary.status, SummaryStatus::Error);
        assert_eq!(summary.doctor_id.as_deref(), Some("doc-1"));
        assert_eq!(summary.doctor_name, "Dr. A");
        assert!(summary.content.contains("timeout"));
    }

    #[test]
    fn test_idle_default() {
        assert_eq!(FinalSummary::idle().status, SummaryStatus::Idle);
    }
}
