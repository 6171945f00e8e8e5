//! Consultation engine
//!
//! The round state machine that drives the whole consultation: turn
//! scheduling, per-message typewriter reveal, pause/resume, the automated
//! voting protocol with its fallbacks, vote tallying, termination, and the
//! final-summary step.
//!
//! One consultation runs as one long-lived task. There is no parallel
//! fan-out across doctors: each turn's provider call and reveal complete
//! before the next turn starts, which keeps the transcript in a
//! deterministic, human-readable order. External collaborators observe
//! state through [`ConsultationObserver`] callbacks and read-only
//! accessors; only the engine writes.

pub mod pause;


pub use pause::PauseGate;

use crate::ports::observer::{ConsultationObserver, NoopObserver};
use crate::ports::provider_gateway::ProviderGateway;
use consilium_domain::{
    ConsultationSettings, ConsultationSnapshot, DomainError, Doctor, FinalSummary, PatientCase,
    Phase, TallyOutcome, Transcript, TranscriptEntry, TurnOrder, VoteRecord, WorkflowState,
    active_ids, build_opinion_prompt, build_summary_prompt, build_vote_prompt,
    format_history_for_provider, parse_vote_json, tally_votes,
};
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Reason used for the forced self-vote of a doctor without a credential
const SIMULATED_VOTE_REASON: &str =
    "Simulated mode: my own reasoning needs further substantiation, voting for myself.";

/// Reason used when a vote reply could not be turned into a valid target
const FALLBACK_VOTE_REASON: &str = "Could not parse the vote: defaulting to a self-vote.";

/// Reason used when a parsed vote carried no reason text
const DEFAULT_VOTE_REASON: &str = "Judgment reached after weighing the discussion.";

/// Delay between revealed characters in the typewriter effect
const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(15);

/// The consultation state machine
///
/// Owns every piece of mutable consultation state. Construct it with a
/// roster and settings, then call [`start`](Self::start) with a patient
/// case; the call returns once the workflow reaches `finished`. Control
/// the run from other tasks through the cloned [`PauseGate`].
pub struct ConsultationEngine<G: ProviderGateway + 'static> {
    settings: ConsultationSettings,
    doctors: Vec<Doctor>,
    case: PatientCase,
    workflow: WorkflowState,
    transcript: Transcript,
    last_round_votes: Vec<VoteRecord>,
    final_summary: FinalSummary,
    gateway: Arc<G>,
    observer: Arc<dyn ConsultationObserver>,
    pause: PauseGate,
    reveal_delay: Duration,
}

impl<G: ProviderGateway + 'static> ConsultationEngine<G> {
    pub fn new(settings: ConsultationSettings, doctors: Vec<Doctor>, gateway: Arc<G>) -> Self {
        Self {
            settings,
            doctors,
            case: PatientCase::default(),
            workflow: WorkflowState::default(),
            transcript: Transcript::new(),
            last_round_votes: Vec::new(),
            final_summary: FinalSummary::idle(),
            gateway,
            observer: Arc::new(NoopObserver),
            pause: PauseGate::new(),
            reveal_delay: DEFAULT_REVEAL_DELAY,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ConsultationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Override the typewriter delay (tests use zero)
    pub fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }

    /// Restore previously persisted state (case, transcript, summary)
    pub fn with_snapshot(mut self, snapshot: ConsultationSnapshot) -> Self {
        self.settings = snapshot.settings;
        self.doctors = snapshot.doctors;
        self.case = snapshot.patient_case;
        self.workflow = snapshot.workflow;
        self.transcript = snapshot.transcript;
        self.last_round_votes = snapshot.last_round_votes;
        self.final_summary = snapshot.final_summary;
        self
    }

    // ==================== Read-only state ====================

    pub fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn case(&self) -> &PatientCase {
        &self.case
    }

    pub fn workflow(&self) -> &WorkflowState {
        &self.workflow
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn last_round_votes(&self) -> &[VoteRecord] {
        &self.last_round_votes
    }

    pub fn final_summary(&self) -> &FinalSummary {
        &self.final_summary
    }

    /// Full state for persistence/export
    pub fn snapshot(&self) -> ConsultationSnapshot {
        let mut workflow = self.workflow.clone();
        workflow.paused = self.pause.is_paused();
        ConsultationSnapshot {
            settings: self.settings.clone(),
            doctors: self.doctors.clone(),
            patient_case: self.case.clone(),
            workflow,
            transcript: self.transcript.clone(),
            last_round_votes: self.last_round_votes.clone(),
            final_summary: self.final_summary.clone(),
        }
    }

    // ==================== Pause control ====================

    /// Clone the pause control for use from another task
    pub fn pause_gate(&self) -> PauseGate {
        self.pause.clone()
    }

    /// Suspend at the next checkpoint (turn, voter, or revealed character)
    pub fn pause(&mut self) {
        self.pause.pause();
        self.workflow.paused = true;
    }

    pub fn resume(&mut self) {
        self.pause.resume();
        self.workflow.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.workflow.paused = self.pause.toggle();
    }

    // ==================== Case and log updates ====================

    /// Append a patient-authored message to the transcript.
    ///
    /// This is an append only; in-flight entries are never edited.
    pub fn add_patient_message(&mut self, text: &str) {
        let content = text.trim();
        if content.is_empty() {
            return;
        }
        let author = self.case.patient_label();
        self.push_entry(TranscriptEntry::patient(author, content));
    }

    /// Record an image-recognition finding on the case
    pub fn set_image_recognition_result(&mut self, text: &str) {
        self.case.image_recognition_result = text.trim().to_string();
    }

    // ==================== State machine ====================

    /// Start the consultation and drive it to the `finished` phase.
    ///
    /// Fails with a validation error, mutating nothing, when the case
    /// lacks a name or a chief complaint, or the roster is empty.
    pub async fn start(&mut self, case: PatientCase) -> Result<(), DomainError> {
        case.validate()?;
        if self.doctors.is_empty() {
            return Err(DomainError::EmptyRoster);
        }

        info!(doctors = self.doctors.len(), "Starting consultation");

        self.case = case;
        for doctor in &mut self.doctors {
            doctor.reset_for_consultation();
        }
        for doctor in self.doctors.clone() {
            self.observer.doctor_updated(&doctor);
        }
        self.workflow.current_round = 1;
        self.workflow.rounds_without_elimination = 0;
        self.resume();
        self.final_summary = FinalSummary::idle();
        self.observer.summary_updated(&self.final_summary);
        self.last_round_votes.clear();
        self.set_phase(Phase::Discussion);

        self.push_system(format!(
            "Round {} of the consultation begins",
            self.workflow.current_round
        ));
        self.generate_turn_queue();

        loop {
            self.run_discussion_round().await;
            self.run_auto_voting().await;
            if self.confirm_vote().await {
                break;
            }
        }
        Ok(())
    }

    /// Ordered active doctor ids for the upcoming round
    fn generate_turn_queue(&mut self) {
        let mut queue = active_ids(&self.doctors);
        if self.settings.turn_order == TurnOrder::Random {
            queue.shuffle(&mut rand::thread_rng());
        }
        debug!(?queue, "Turn queue generated");
        self.workflow.turn_queue = queue;
    }

    /// One full pass of the turn queue: every active doctor speaks once
    async fn run_discussion_round(&mut self) {
        for doctor_id in self.workflow.turn_queue.clone() {
            let Some(doctor) = self.doctors.iter().find(|d| d.id == doctor_id).cloned() else {
                continue;
            };
            // A doctor should not become inactive mid-round, but skip if so
            if !doctor.is_active() {
                continue;
            }

            self.pause.wait_until_resumed().await;
            self.workflow.active_turn = Some(doctor.id.clone());
            let typing_index =
                self.push_system(format!("{} is typing...", doctor.name));

            let system_prompt = doctor
                .system_prompt(&self.settings.global_system_prompt)
                .to_string();
            let prompt =
                build_opinion_prompt(&system_prompt, &self.case, &self.transcript, Some(&doctor.id));
            let history =
                format_history_for_provider(&self.transcript, &self.case, Some(&doctor.id));

            let gateway = Arc::clone(&self.gateway);
            match gateway.send(&doctor, &prompt, &history).await {
                Ok(reply) => {
                    self.remove_entry(typing_index);
                    let index =
                        self.push_entry(TranscriptEntry::doctor(&doctor.id, &doctor.name, ""));
                    self.reveal(index, &reply).await;
                    self.workflow.active_turn = None;
                }
                Err(error) => {
                    warn!(doctor = %doctor.name, %error, "Provider call failed, continuing round");
                    self.workflow.active_turn = None;
                    self.remove_entry(typing_index);
                    self.push_entry(TranscriptEntry::doctor(
                        &doctor.id,
                        &doctor.name,
                        format!("Call to {} failed: {}", doctor.name, error),
                    ));
                }
            }
        }

        self.set_phase(Phase::Voting);
        self.push_system("This round's statements are complete. The doctors are voting...");
    }

    /// Reveal `text` character by character into the entry at `index`
    async fn reveal(&mut self, index: usize, text: &str) {
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            self.pause.wait_until_resumed().await;
            let chunk: &str = ch.encode_utf8(&mut buf);
            self.transcript.append_doctor_content(index, chunk);
            self.observer.entry_content_appended(index, chunk);
            if !self.reveal_delay.is_zero() {
                tokio::time::sleep(self.reveal_delay).await;
            }
        }
    }

    /// The automated voting protocol: every active doctor, in roster order
    async fn run_auto_voting(&mut self) {
        self.reset_votes();
        self.last_round_votes.clear();

        let voters: Vec<Doctor> = self.doctors.iter().filter(|d| d.is_active()).cloned().collect();
        let active: Vec<String> = voters.iter().map(|d| d.id.clone()).collect();

        for voter in &voters {
            self.pause.wait_until_resumed().await;

            let mut target_id: Option<String> = None;
            let mut reason = String::new();

            if !voter.has_credential() {
                // Simulated mode: deterministic self-vote, no network call
                target_id = Some(voter.id.clone());
                reason = SIMULATED_VOTE_REASON.to_string();
            } else {
                let system_prompt = voter
                    .system_prompt(&self.settings.global_system_prompt)
                    .to_string();
                let prompt = build_vote_prompt(
                    &system_prompt,
                    &self.case,
                    &self.transcript,
                    &voters,
                    voter,
                );
                let history =
                    format_history_for_provider(&self.transcript, &self.case, Some(&voter.id));

                let gateway = Arc::clone(&self.gateway);
                match gateway.send(voter, &prompt, &history).await {
                    Ok(reply) => {
                        if let Some(decision) = parse_vote_json(&reply) {
                            target_id = Some(decision.target_doctor_id);
                            reason = if decision.reason.trim().is_empty() {
                                DEFAULT_VOTE_REASON.to_string()
                            } else {
                                decision.reason.trim().to_string()
                            };
                        }
                    }
                    Err(error) => {
                        warn!(voter = %voter.name, %error, "Vote call failed, falling back");
                    }
                }
            }

            // Reject unparseable votes and targets outside the active roster
            let valid = target_id
                .as_deref()
                .map(|t| active.iter().any(|id| id == t))
                .unwrap_or(false);
            if !valid {
                target_id = Some(voter.id.clone());
                if reason.is_empty() {
                    reason = FALLBACK_VOTE_REASON.to_string();
                }
            }

            let target_id = target_id.unwrap_or_else(|| voter.id.clone());
            let target_name = self
                .doctors
                .iter()
                .find(|d| d.id == target_id)
                .map(|d| d.name.clone())
                .unwrap_or_else(|| voter.name.clone());

            let record = VoteRecord {
                round: self.workflow.current_round,
                voter_id: voter.id.clone(),
                voter_name: voter.name.clone(),
                target_id: target_id.clone(),
                target_name: target_name.clone(),
                reason: reason.clone(),
            };
            self.last_round_votes.push(record.clone());
            self.observer.vote_recorded(&record);
            self.push_entry(TranscriptEntry::VoteDetail {
                voter_id: voter.id.clone(),
                voter_name: voter.name.clone(),
                target_id: target_id.clone(),
                target_name,
                reason,
            });
            self.cast_vote(&target_id).ok();
        }
    }

    /// Manual voting path: add one vote for `target_id`
    pub fn cast_vote(&mut self, target_id: &str) -> Result<(), DomainError> {
        let Some(doctor) = self.doctors.iter_mut().find(|d| d.id == target_id) else {
            return Err(DomainError::UnknownDoctor(target_id.to_string()));
        };
        doctor.votes += 1;
        let doctor = doctor.clone();
        self.observer.doctor_updated(&doctor);
        Ok(())
    }

    /// Tally the round and either finish or prepare the next round.
    ///
    /// Returns true when the consultation reached its terminal phase.
    pub async fn confirm_vote(&mut self) -> bool {
        let outcome = tally_votes(&mut self.doctors);
        match &outcome {
            TallyOutcome::Eliminated { doctor_id, doctor_name } => {
                info!(doctor = %doctor_name, "Doctor eliminated");
                self.workflow.rounds_without_elimination = 0;
                if let Some(doctor) = self.doctors.iter().find(|d| &d.id == doctor_id).cloned() {
                    self.observer.doctor_updated(&doctor);
                }
            }
            TallyOutcome::NoElimination => {
                self.workflow.rounds_without_elimination += 1;
            }
        }
        self.push_entry(TranscriptEntry::vote_result(outcome.message()));

        let ended = self.check_end_conditions().await;
        if !ended {
            self.reset_votes();
            self.workflow.current_round += 1;
            self.push_system(format!(
                "Round {} of the consultation begins",
                self.workflow.current_round
            ));
            self.set_phase(Phase::Discussion);
            self.generate_turn_queue();
        }
        ended
    }

    /// Evaluate the end conditions after a tally
    async fn check_end_conditions(&mut self) -> bool {
        let active_count = self.doctors.iter().filter(|d| d.is_active()).count();

        if self.workflow.rounds_without_elimination
            >= self.settings.max_rounds_without_elimination
        {
            self.set_phase(Phase::Finished);
            self.push_system(
                "The cap on rounds without an elimination was reached. The consultation ends.",
            );
            self.generate_final_summary(None).await;
            return true;
        }

        if active_count <= 1 {
            self.set_phase(Phase::Finished);
            if let Some(winner) = self.doctors.iter().find(|d| d.is_active()).cloned() {
                self.push_system(format!("Consultation over: {} prevails.", winner.name));
                self.generate_final_summary(Some(&winner.id)).await;
            } else {
                self.push_system("Consultation over: no doctors remain.");
                self.generate_final_summary(None).await;
            }
            return true;
        }

        self.workflow.phase = Phase::Voting;
        false
    }

    /// Generate (or regenerate) the final summary.
    ///
    /// Summarizer choice: `preferred` if present, else the first active
    /// doctor, else the first doctor in the roster, else a no-op. The
    /// `pending` state is published before the provider call.
    pub async fn generate_final_summary(&mut self, preferred: Option<&str>) {
        let summarizer = preferred
            .and_then(|id| self.doctors.iter().find(|d| d.id == id))
            .or_else(|| self.doctors.iter().find(|d| d.is_active()))
            .or_else(|| self.doctors.first())
            .cloned();
        let Some(summarizer) = summarizer else {
            return;
        };

        let used_prompt = if self.settings.summary_prompt.trim().is_empty() {
            consilium_domain::DEFAULT_SUMMARY_PROMPT.to_string()
        } else {
            self.settings.summary_prompt.clone()
        };

        self.final_summary = FinalSummary::begin(&summarizer.id, &summarizer.name, &used_prompt);
        self.observer.summary_updated(&self.final_summary);

        let prompt = build_summary_prompt(&used_prompt, &self.case, &self.transcript);
        let history = format_history_for_provider(&self.transcript, &self.case, None);

        let gateway = Arc::clone(&self.gateway);
        match gateway.send(&summarizer, &prompt, &history).await {
            Ok(content) => self.final_summary.mark_ready(content),
            Err(error) => {
                warn!(%error, "Final summary generation failed");
                self.final_summary.mark_error(error.to_string());
            }
        }
        self.observer.summary_updated(&self.final_summary);
    }

    // ==================== Internals ====================

    fn reset_votes(&mut self) {
        for doctor in &mut self.doctors {
            doctor.votes = 0;
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        self.workflow.phase = phase;
        self.observer.phase_changed(phase, self.workflow.current_round);
    }

    fn push_entry(&mut self, entry: TranscriptEntry) -> usize {
        let index = self.transcript.push(entry);
        if let Some(entry) = self.transcript.get(index) {
            self.observer.entry_appended(index, entry);
        }
        index
    }

    fn push_system(&mut self, content: impl Into<String>) -> usize {
        self.push_entry(TranscriptEntry::system(content))
    }

    fn remove_entry(&mut self, index: usize) {
        if self.transcript.remove(index).is_some() {
            self.observer.entry_removed(index);
        }
    }
}
