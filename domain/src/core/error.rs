//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid patient case: {0}")]
    InvalidCase(String),

    #[error("No doctors configured")]
    EmptyRoster,

    #[error("Unknown doctor: {0}")]
    UnknownDoctor(String),

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),
}
