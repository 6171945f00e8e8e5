//! Ports (interfaces) consumed and exposed by the application layer

pub mod observer;
pub mod provider_gateway;
pub mod snapshot_store;

pub use observer::{ConsultationObserver, NoopObserver};
pub use provider_gateway::{ModelCatalog, ModelOption, ProviderError, ProviderGateway};
pub use snapshot_store::{SessionMeta, SnapshotStore, StoreError};
