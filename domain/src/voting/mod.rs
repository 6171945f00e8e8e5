//! Voting primitives for the elimination protocol
//!
//! Each active doctor casts exactly one vote per round, naming the
//! colleague whose answer they judged least convincing. Self-voting is
//! permitted, and is forced in simulated mode.

pub mod parsing;
pub mod tally;

use serde::{Deserialize, Serialize};

pub use parsing::parse_vote_json;
pub use tally::{TallyOutcome, tally_votes};

/// A structured decision extracted from a model's vote reply
///
/// Mirrors the JSON object the vote prompt demands:
/// `{"targetDoctorId": "<id>", "reason": "<short text>"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteDecision {
    #[serde(rename = "targetDoctorId")]
    pub target_doctor_id: String,
    #[serde(default)]
    pub reason: String,
}

/// One recorded vote: who voted, for whom, and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub round: u32,
    pub voter_id: String,
    pub voter_name: String,
    pub target_id: String,
    pub target_name: String,
    pub reason: String,
}
