//! Consultation report rendering
//!
//! Renders a snapshot to a markdown document: case block, full
//! transcript, vote annotations, and the final summary. Pure string
//! building; callers decide where the report goes.

use consilium_domain::{
    ConsultationSnapshot, SummaryStatus, TranscriptEntry, format_case,
};

/// Render a full consultation report as markdown
pub fn render_markdown(title: &str, generated_at: &str, snapshot: &ConsultationSnapshot) -> String {
    let mut out = String::new();

    out.push_str("# AI Medical Consultation Report\n\n");
    out.push_str(&format!("**Session**: {}\n\n", title));
    out.push_str(&format!("**Generated**: {}\n\n", generated_at));

    out.push_str("## Patient record\n\n");
    let case_block = format_case(&snapshot.patient_case);
    if case_block.is_empty() {
        out.push_str("_No case information recorded._\n\n");
    } else {
        out.push_str(&format!("```\n{}\n```\n\n", case_block));
    }

    out.push_str("## Consultation transcript\n\n");
    if snapshot.transcript.is_empty() {
        out.push_str("_The discussion has not started yet._\n\n");
    }
    for entry in &snapshot.transcript {
        match entry {
            TranscriptEntry::System { content } => {
                out.push_str(&format!("> {}\n\n", content));
            }
            TranscriptEntry::Doctor { doctor_name, content, .. } => {
                out.push_str(&format!("**Doctor {}**:\n\n{}\n\n", doctor_name, content));
            }
            TranscriptEntry::Patient { author, content } => {
                out.push_str(&format!("**{}**:\n\n{}\n\n", author, content));
            }
            TranscriptEntry::VoteDetail {
                voter_name,
                target_name,
                reason,
                ..
            } => {
                out.push_str(&format!(
                    "- *{}* flagged *{}* as least convincing: {}\n",
                    voter_name, target_name, reason
                ));
            }
            TranscriptEntry::VoteResult { content } => {
                out.push_str(&format!("\n> **{}**\n\n", content));
            }
        }
    }

    if snapshot.final_summary.status == SummaryStatus::Ready {
        out.push_str("## Final summary\n\n");
        out.push_str(&format!(
            "_Written by {}_\n\n",
            snapshot.final_summary.doctor_name
        ));
        out.push_str(&snapshot.final_summary.content);
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use consilium_domain::FinalSummary;

    fn snapshot() -> ConsultationSnapshot {
        let mut snapshot = ConsultationSnapshot::default();
        snapshot.patient_case.name = "Alice".to_string();
        snapshot.patient_case.current_problem = "persistent cough".to_string();
        snapshot.transcript.push(TranscriptEntry::system("Round 1 begins"));
        snapshot
            .transcript
            .push(TranscriptEntry::doctor("doc-1", "Dr. A", "Likely bronchitis."));
        snapshot.transcript.push(TranscriptEntry::VoteDetail {
            voter_id: "doc-2".to_string(),
            voter_name: "Dr. B".to_string(),
            target_id: "doc-1".to_string(),
            target_name: "Dr. A".to_string(),
            reason: "evidence is thin".to_string(),
        });
        snapshot
            .transcript
            .push(TranscriptEntry::vote_result("Voting closed: Dr. A is eliminated."));
        snapshot
    }

    #[test]
    fn test_report_sections() {
        let mut snap = snapshot();
        let mut summary = FinalSummary::begin("doc-2", "Dr. B", "prompt");
        summary.mark_ready("1) Core diagnosis ...");
        snap.final_summary = summary;

        let report = render_markdown("Morning clinic", "2025-11-02T09:00:00Z", &snap);
        assert!(report.contains("# AI Medical Consultation Report"));
        assert!(report.contains("**Session**: Morning clinic"));
        assert!(report.contains("Chief complaint: persistent cough"));
        assert!(report.contains("**Doctor Dr. A**:"));
        assert!(report.contains("*Dr. B* flagged *Dr. A*"));
        assert!(report.contains("> **Voting closed: Dr. A is eliminated.**"));
        assert!(report.contains("_Written by Dr. B_"));
        assert!(report.contains("1) Core diagnosis"));
    }

    #[test]
    fn test_unready_summary_is_omitted() {
        let report = render_markdown("s", "t", &snapshot());
        assert!(!report.contains("## Final summary"));
    }

    #[test]
    fn test_empty_snapshot_renders_placeholders() {
        let report = render_markdown("s", "t", &ConsultationSnapshot::default());
        assert!(report.contains("_No case information recorded._"));
        assert!(report.contains("_The discussion has not started yet._"));
    }
}
