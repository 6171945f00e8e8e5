//! Application layer for consilium
//!
//! Use cases and ports. The [`engine`] module holds the consultation state
//! machine; [`ports`] defines the interfaces it consumes (provider
//! gateway, snapshot store) and exposes (observer callbacks).

pub mod engine;
pub mod ports;

pub use engine::{ConsultationEngine, PauseGate};
pub use ports::{
    ConsultationObserver, ModelCatalog, ModelOption, NoopObserver, ProviderError, ProviderGateway,
    SessionMeta, SnapshotStore, StoreError,
};
