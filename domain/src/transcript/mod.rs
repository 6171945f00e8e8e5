//! Consultation transcript
//!
//! An append-only, chronologically ordered log. The engine is the only
//! writer. The single sanctioned removal is the transient "typing"
//! placeholder, deleted once the real reply (or a failure entry) lands.

use serde::{Deserialize, Serialize};

/// One entry in the discussion log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptEntry {
    /// Status text (round markers, typing placeholders, end notices)
    System { content: String },
    /// A doctor's authored opinion; content may grow incrementally
    Doctor {
        doctor_id: String,
        doctor_name: String,
        content: String,
    },
    /// A patient-authored message
    Patient { author: String, content: String },
    /// One voter's choice and reason, emitted during voting
    VoteDetail {
        voter_id: String,
        voter_name: String,
        target_id: String,
        target_name: String,
        reason: String,
    },
    /// Tally outcome text
    VoteResult { content: String },
}

impl TranscriptEntry {
    pub fn system(content: impl Into<String>) -> Self {
        TranscriptEntry::System {
            content: content.into(),
        }
    }

    pub fn doctor(
        doctor_id: impl Into<String>,
        doctor_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        TranscriptEntry::Doctor {
            doctor_id: doctor_id.into(),
            doctor_name: doctor_name.into(),
            content: content.into(),
        }
    }

    pub fn patient(author: impl Into<String>, content: impl Into<String>) -> Self {
        TranscriptEntry::Patient {
            author: author.into(),
            content: content.into(),
        }
    }

    pub fn vote_result(content: impl Into<String>) -> Self {
        TranscriptEntry::VoteResult {
            content: content.into(),
        }
    }
}

/// The discussion log (Entity)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TranscriptEntry> {
        self.entries.get(index)
    }

    /// Append an entry, returning its index
    pub fn push(&mut self, entry: TranscriptEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    /// Remove the entry at `index` (typing-placeholder cleanup only)
    pub fn remove(&mut self, index: usize) -> Option<TranscriptEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    /// Append text to a doctor entry's content (typewriter reveal step)
    ///
    /// Returns false when the index does not point at a doctor entry.
    pub fn append_doctor_content(&mut self, index: usize, chunk: &str) -> bool {
        match self.entries.get_mut(index) {
            Some(TranscriptEntry::Doctor { content, .. }) => {
                content.push_str(chunk);
                true
            }
            _ => false,
        }
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a TranscriptEntry;
    type IntoIter = std::slice::Iter<'a, TranscriptEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
