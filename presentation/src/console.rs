//! Console transcript presenter
//!
//! Renders observer callbacks as a live terminal transcript, including the
//! per-character typewriter stream. Runs on the engine's task, so every
//! callback just formats and prints.

use colored::Colorize;
use consilium_application::ports::observer::ConsultationObserver;
use consilium_domain::{FinalSummary, SummaryStatus, TranscriptEntry};
use std::io::Write;
use std::sync::Mutex;

pub struct ConsolePresenter {
    /// Whether a doctor's streaming line is still being revealed
    line_open: Mutex<bool>,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self {
            line_open: Mutex::new(false),
        }
    }

    fn close_line(&self) {
        let mut line_open = self.line_open.lock().unwrap_or_else(|e| e.into_inner());
        if *line_open {
            println!();
            *line_open = false;
        }
    }

    fn open_line(&self) {
        let mut line_open = self.line_open.lock().unwrap_or_else(|e| e.into_inner());
        *line_open = true;
    }
}

impl Default for ConsolePresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsultationObserver for ConsolePresenter {
    fn entry_appended(&self, _index: usize, entry: &TranscriptEntry) {
        self.close_line();
        match entry {
            TranscriptEntry::System { content } => {
                println!("{}", content.dimmed());
            }
            TranscriptEntry::Doctor {
                doctor_name,
                content,
                ..
            } => {
                let header = format!("{}:", doctor_name).blue().bold();
                if content.is_empty() {
                    // The reveal stream fills this line character by character
                    print!("{} ", header);
                    let _ = std::io::stdout().flush();
                    self.open_line();
                } else {
                    println!("{} {}", header, content);
                }
            }
            TranscriptEntry::Patient { author, content } => {
                println!("{} {}", format!("{}:", author).cyan().bold(), content);
            }
            TranscriptEntry::VoteDetail {
                voter_name,
                target_name,
                reason,
                ..
            } => {
                println!(
                    "{}",
                    format!(
                        "{} flagged {} as least convincing: {}",
                        voter_name, target_name, reason
                    )
                    .yellow()
                );
            }
            TranscriptEntry::VoteResult { content } => {
                println!("{}", content.yellow().bold());
            }
        }
    }

    fn entry_content_appended(&self, _index: usize, chunk: &str) {
        print!("{}", chunk);
        let _ = std::io::stdout().flush();
    }

    fn summary_updated(&self, summary: &FinalSummary) {
        match summary.status {
            SummaryStatus::Pending => {
                self.close_line();
                println!(
                    "{}",
                    format!("Generating the final summary ({})...", summary.doctor_name).dimmed()
                );
            }
            SummaryStatus::Ready => {
                println!();
                println!(
                    "{}",
                    format!("=== Final summary (by {}) ===", summary.doctor_name)
                        .green()
                        .bold()
                );
                println!("{}", summary.content);
            }
            SummaryStatus::Error => {
                println!("{}", summary.content.red());
            }
            SummaryStatus::Idle => {}
        }
    }
}
