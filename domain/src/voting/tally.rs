//! Vote tallying and elimination
//!
//! A doctor is eliminated only on a strict plurality: the unique maximum
//! vote count among active doctors, and at least one vote cast. Ties and
//! all-zero rounds eliminate nobody.

use crate::participant::Doctor;
use serde::{Deserialize, Serialize};

/// Outcome of tallying one voting round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TallyOutcome {
    /// The unique top-voted doctor left the table
    Eliminated {
        doctor_id: String,
        doctor_name: String,
    },
    /// Tie or no votes: nobody leaves this round
    NoElimination,
}

impl TallyOutcome {
    pub fn eliminated(&self) -> bool {
        matches!(self, TallyOutcome::Eliminated { .. })
    }

    /// Transcript text for the vote-result entry
    pub fn message(&self) -> String {
        match self {
            TallyOutcome::Eliminated { doctor_name, .. } => {
                format!("Voting closed: {} is eliminated.", doctor_name)
            }
            TallyOutcome::NoElimination => {
                "Voting closed: tie or no votes, nobody is eliminated this round.".to_string()
            }
        }
    }
}

/// Tally the current vote counts and apply the elimination, if any.
///
/// Mutates the roster: on a strict plurality the top doctor transitions
/// active → eliminated (terminal for the consultation).
pub fn tally_votes(doctors: &mut [Doctor]) -> TallyOutcome {
    let max_votes = doctors
        .iter()
        .filter(|d| d.is_active())
        .map(|d| d.votes)
        .max()
        .unwrap_or(0);

    let top: Vec<usize> = doctors
        .iter()
        .enumerate()
        .filter(|(_, d)| d.is_active() && d.votes == max_votes)
        .map(|(i, _)| i)
        .collect();

    if max_votes == 0 || top.len() != 1 {
        return TallyOutcome::NoElimination;
    }

    let target = &mut doctors[top[0]];
    target.eliminate();
    TallyOutcome::Eliminated {
        doctor_id: target.id.clone(),
        doctor_name: target.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::ProviderKind;

    fn roster(votes: &[(&str, u32)]) -> Vec<Doctor> {
        votes
            .iter()
            .map(|(id, count)| {
                let mut doctor =
                    Doctor::new(*id, format!("Dr. {}", id), ProviderKind::OpenAi, "gpt-4o-mini");
                doctor.votes = *count;
                doctor
            })
            .collect()
    }

    #[test]
    fn test_strict_plurality_eliminates() {
        let mut doctors = roster(&[("a", 3), ("b", 1)]);
        let outcome = tally_votes(&mut doctors);
        assert_eq!(
            outcome,
            TallyOutcome::Eliminated {
                doctor_id: "a".to_string(),
                doctor_name: "Dr. a".to_string(),
            }
        );
        assert!(!doctors[0].is_active());
        assert!(doctors[1].is_active());
    }

    #[test]
    fn test_tie_eliminates_nobody() {
        let mut doctors = roster(&[("a", 2), ("b", 2), ("c", 1)]);
        assert_eq!(tally_votes(&mut doctors), TallyOutcome::NoElimination);
        assert!(doctors.iter().all(|d| d.is_active()));
    }

    #[test]
    fn test_zero_votes_eliminates_nobody() {
        let mut doctors = roster(&[("a", 0), ("b", 0)]);
        assert_eq!(tally_votes(&mut doctors), TallyOutcome::NoElimination);
    }

    #[test]
    fn test_eliminated_doctors_are_ignored() {
        let mut doctors = roster(&[("a", 5), ("b", 1), ("c", 2)]);
        doctors[0].eliminate();
        let outcome = tally_votes(&mut doctors);
        // "a" holds the most votes but is already out; "c" wins the tally
        assert_eq!(
            outcome,
            TallyOutcome::Eliminated {
                doctor_id: "c".to_string(),
                doctor_name: "Dr. c".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_roster_is_no_elimination() {
        let mut doctors: Vec<Doctor> = Vec::new();
        assert_eq!(tally_votes(&mut doctors), TallyOutcome::NoElimination);
    }

    #[test]
    fn test_messages() {
        assert!(TallyOutcome::NoElimination.message().contains("tie or no votes"));
        let outcome = TallyOutcome::Eliminated {
            doctor_id: "a".to_string(),
            doctor_name: "Dr. a".to_string(),
        };
        assert!(outcome.message().contains("Dr. a is eliminated"));
    }
}
