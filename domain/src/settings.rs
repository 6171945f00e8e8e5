//! Consultation settings
//!
//! Injected into the engine by the caller; the engine never reaches into
//! ambient configuration.

use crate::workflow::TurnOrder;
use serde::{Deserialize, Serialize};

/// System prompt shared by doctors that have no custom one
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a top-tier, highly experienced clinical \
diagnostician. Your task is to analyze and diagnose based on the patient record provided.\n\n\
You are taking part in a multi-party expert consultation. You will see the other doctors' \
diagnostic opinions. Weigh their analysis, since it may inform you, but keep your own independent \
professional judgment.\n\nYour statements must follow these principles:\n\
1. Professional rigor: ground every claim in medical knowledge and the record.\n\
2. Independent thinking: do not abandon your core position just to agree. Endorse and extend \
correct points; clearly and concretely rebut ones you believe are wrong.\n\
3. Goal orientation: the sole aim of the consultation is the best outcome for the patient.\n\
4. Clarity and brevity: state your core diagnosis, reasoning, and recommendations directly.\n\n\
Now, based on the record and the discussion so far, give your opinion.";

/// Default instruction for the final summary
pub const DEFAULT_SUMMARY_PROMPT: &str = "Based on the complete consultation, write the final \
summary in the voice of the attending clinician: core diagnosis, supporting evidence, \
differential diagnosis, recommended workup, treatment plan, follow-up schedule, and risk \
warnings.";

/// Tunable consultation behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsultationSettings {
    pub global_system_prompt: String,
    pub summary_prompt: String,
    pub turn_order: TurnOrder,
    /// Stalemate cap: consecutive no-elimination rounds before forced end
    pub max_rounds_without_elimination: u32,
}

impl Default for ConsultationSettings {
    fn default() -> Self {
        Self {
            global_system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            summary_prompt: DEFAULT_SUMMARY_PROMPT.to_string(),
            turn_order: TurnOrder::default(),
            max_rounds_without_elimination: 3,
        }
    }
}
