//! Configuration file schema
//!
//! Example configuration:
//!
//! ```toml
//! [consultation]
//! turn_order = "random"
//! max_rounds_without_elimination = 3
//!
//! [[doctors]]
//! id = "doc-1"
//! name = "Dr. GPT-4"
//! provider = "openai"
//! model = "gpt-4o-mini"
//!
//! [image_recognition]
//! enabled = true
//! max_concurrent = 2
//! ```

use consilium_domain::{
    ConsultationSettings, DEFAULT_SUMMARY_PROMPT, DEFAULT_SYSTEM_PROMPT, DomainError, Doctor,
    TurnOrder,
};
use serde::{Deserialize, Serialize};

/// Default instruction for the vision model describing lesion images
pub const DEFAULT_RECOGNITION_PROMPT: &str = "Identify the lesion-related content of this \
image. Examine every detail and describe, in precise medical terminology, the lesion's \
characteristics, location, morphology, color, size, and other key findings. If the image shows \
nothing lesion-related or is unrelated to medical diagnosis, state plainly that the image is \
not lesion-related. Keep the tone professional and rigorous.";

/// Root configuration, merged from defaults, global, and project files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub consultation: FileConsultationConfig,
    pub doctors: Vec<FileDoctorConfig>,
    pub image_recognition: FileImageRecognitionConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            consultation: FileConsultationConfig::default(),
            doctors: default_roster(),
            image_recognition: FileImageRecognitionConfig::default(),
        }
    }
}

impl FileConfig {
    /// Build the runtime roster, rejecting unknown provider identifiers
    pub fn roster(&self) -> Result<Vec<Doctor>, DomainError> {
        self.doctors.iter().map(|d| d.to_doctor()).collect()
    }
}

/// `[consultation]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsultationConfig {
    pub system_prompt: String,
    pub summary_prompt: String,
    pub turn_order: TurnOrder,
    pub max_rounds_without_elimination: u32,
    /// Typewriter delay between revealed characters
    pub reveal_delay_ms: u64,
}

impl Default for FileConsultationConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            summary_prompt: DEFAULT_SUMMARY_PROMPT.to_string(),
            turn_order: TurnOrder::default(),
            max_rounds_without_elimination: 3,
            reveal_delay_ms: 15,
        }
    }
}

impl FileConsultationConfig {
    pub fn to_settings(&self) -> ConsultationSettings {
        ConsultationSettings {
            global_system_prompt: self.system_prompt.clone(),
            summary_prompt: self.summary_prompt.clone(),
            turn_order: self.turn_order,
            max_rounds_without_elimination: self.max_rounds_without_elimination,
        }
    }
}

/// One `[[doctors]]` roster entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDoctorConfig {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub custom_prompt: String,
}

impl Default for FileDoctorConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            provider: "openai".to_string(),
            model: String::new(),
            api_key: String::new(),
            base_url: String::new(),
            custom_prompt: String::new(),
        }
    }
}

impl FileDoctorConfig {
    pub fn to_doctor(&self) -> Result<Doctor, DomainError> {
        Ok(Doctor::new(&self.id, &self.name, self.provider.parse()?, &self.model)
            .with_api_key(&self.api_key)
            .with_base_url(&self.base_url)
            .with_custom_prompt(&self.custom_prompt))
    }
}

/// The roster shipped when no configuration names one
pub fn default_roster() -> Vec<FileDoctorConfig> {
    vec![
        FileDoctorConfig {
            id: "doc-1".to_string(),
            name: "Dr. GPT-4".to_string(),
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            ..Default::default()
        },
        FileDoctorConfig {
            id: "doc-2".to_string(),
            name: "Dr. Claude 3".to_string(),
            provider: "anthropic".to_string(),
            model: "claude-3-haiku-20240307".to_string(),
            ..Default::default()
        },
        FileDoctorConfig {
            id: "doc-3".to_string(),
            name: "Dr. Gemini".to_string(),
            provider: "gemini".to_string(),
            model: "gemini-1.5-flash".to_string(),
            ..Default::default()
        },
    ]
}

/// `[image_recognition]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileImageRecognitionConfig {
    pub enabled: bool,
    pub provider: String,
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub prompt: String,
    pub max_concurrent: usize,
}

impl Default for FileImageRecognitionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "siliconflow".to_string(),
            model: "Pro/Qwen/Qwen2-VL-72B-Instruct".to_string(),
            api_key: String::new(),
            base_url: String::new(),
            prompt: DEFAULT_RECOGNITION_PROMPT.to_string(),
            max_concurrent: 1,
        }
    }
}

impl FileImageRecognitionConfig {
    /// Queue width, never below one
    pub fn effective_max_concurrent(&self) -> usize {
        self.max_concurrent.max(1)
    }
}
