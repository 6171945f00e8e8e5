//! Consultation observer port
//!
//! The engine is the transcript's single writer; readers subscribe to
//! change notifications instead of sharing a mutable reference. A UI layer
//! implements this trait to render the consultation live.

use consilium_domain::{Doctor, FinalSummary, Phase, TranscriptEntry, VoteRecord};

/// Callbacks for incremental consultation updates
///
/// All methods have empty defaults so implementations pick what they need.
/// Callbacks run on the engine's task and should return quickly.
pub trait ConsultationObserver: Send + Sync {
    /// A new entry landed at `index`
    fn entry_appended(&self, _index: usize, _entry: &TranscriptEntry) {}

    /// A doctor entry at `index` grew by `chunk` (typewriter reveal)
    fn entry_content_appended(&self, _index: usize, _chunk: &str) {}

    /// The entry at `index` was removed (typing-placeholder cleanup)
    fn entry_removed(&self, _index: usize) {}

    /// The workflow moved to `phase` in round `round`
    fn phase_changed(&self, _phase: Phase, _round: u32) {}

    /// A doctor's status or vote count changed
    fn doctor_updated(&self, _doctor: &Doctor) {}

    /// A vote was recorded during the voting phase
    fn vote_recorded(&self, _record: &VoteRecord) {}

    /// The final summary changed state
    fn summary_updated(&self, _summary: &FinalSummary) {}
}

/// No-op observer for headless runs and tests
pub struct NoopObserver;

impl ConsultationObserver for NoopObserver {}
