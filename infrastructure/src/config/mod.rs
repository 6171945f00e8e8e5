//! Configuration loading and schema
//!
//! Roster and image-recognition settings live outside the consultation
//! object; callers load them here and hand them to the engine by
//! parameter.

pub mod file_config;
pub mod loader;

pub use file_config::{
    DEFAULT_RECOGNITION_PROMPT, FileConfig, FileConsultationConfig, FileDoctorConfig,
    FileImageRecognitionConfig, default_roster,
};
pub use loader::ConfigLoader;
