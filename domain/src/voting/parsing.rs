//! Vote response parsing
//!
//! Extracts a structured [`VoteDecision`] from free-form model output.
//! Pure text handling: no I/O, never panics. A `None` result means the
//! caller could not determine a vote and should fall back to a self-vote.

use super::VoteDecision;

/// Parse a vote reply, tolerating minor JSON malformation.
///
/// Takes the substring from the first `{` to the last `}` and attempts a
/// JSON parse; on failure retries once with single quotes rewritten to
/// double quotes.
///
/// # Examples
///
/// ```
/// use consilium_domain::voting::parse_vote_json;
///
/// let decision =
///     parse_vote_json("sure: {\"targetDoctorId\":\"doc-2\",\"reason\":\"vague\"} done").unwrap();
/// assert_eq!(decision.target_doctor_id, "doc-2");
///
/// assert!(parse_vote_json("no braces here").is_none());
/// ```
pub fn parse_vote_json(text: &str) -> Option<VoteDecision> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }

    let candidate = &text[start..=end];
    if let Ok(decision) = serde_json::from_str::<VoteDecision>(candidate) {
        return Some(decision);
    }

    // Single-quoted pseudo-JSON is the most common malformation
    let fixed = candidate.replace('\'', "\"");
    serde_json::from_str::<VoteDecision>(&fixed).ok()
}
