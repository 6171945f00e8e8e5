//! Infrastructure layer for consilium
//!
//! External adapters and implementations: HTTP provider clients,
//! configuration loading, the JSON session store, the image-recognition
//! queue, and report export.

pub mod config;
pub mod export;
pub mod image;
pub mod providers;
pub mod store;

pub use config::{ConfigLoader, FileConfig};
pub use export::render_markdown;
pub use image::{
    ImageRecognizer, JobStatus, QueuedImage, RecognitionError, RecognitionQueue, RecognizedImage,
    SiliconFlowRecognizer,
};
pub use providers::HttpProviderGateway;
pub use store::JsonSnapshotStore;
