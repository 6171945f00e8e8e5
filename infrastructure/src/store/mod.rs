//! JSON-file snapshot store
//!
//! One directory holds a `meta.json` index plus one data file per
//! session. The storage medium is opaque to the engine; this adapter is
//! the only code that knows about paths.

use chrono::Utc;
use consilium_application::ports::snapshot_store::{SessionMeta, SnapshotStore, StoreError};
use consilium_domain::ConsultationSnapshot;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const META_FILE: &str = "meta.json";

/// Snapshot store rooted at a directory
pub struct JsonSnapshotStore {
    root: PathBuf,
}

impl JsonSnapshotStore {
    /// Open (creating if needed) a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The default per-user location, e.g. `~/.local/share/consilium/sessions`
    pub fn at_default_location() -> Result<Self, StoreError> {
        let root = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("consilium")
            .join("sessions");
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn meta_path(&self) -> PathBuf {
        self.root.join(META_FILE)
    }

    fn data_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }

    fn read_meta(&self) -> Result<Vec<SessionMeta>, StoreError> {
        match fs::read_to_string(self.meta_path()) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_meta(&self, meta: &[SessionMeta]) -> Result<(), StoreError> {
        fs::write(self.meta_path(), serde_json::to_string_pretty(meta)?)?;
        Ok(())
    }

    /// Millisecond ids collide under rapid creation; suffix until free
    fn fresh_id(&self, meta: &[SessionMeta]) -> String {
        let base = format!("consult-{}", Utc::now().timestamp_millis());
        if !meta.iter().any(|m| m.id == base) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}-{}", base, n);
            if !meta.iter().any(|m| m.id == candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

impl SnapshotStore for JsonSnapshotStore {
    fn create(&self, name: &str) -> Result<SessionMeta, StoreError> {
        let mut meta = self.read_meta()?;
        let now = Utc::now().to_rfc3339();
        let entry = SessionMeta {
            id: self.fresh_id(&meta),
            name: if name.trim().is_empty() {
                "Untitled consultation".to_string()
            } else {
                name.trim().to_string()
            },
            status: "Preparing".to_string(),
            created_at: now.clone(),
            updated_at: now,
        };

        fs::write(
            self.data_path(&entry.id),
            serde_json::to_string_pretty(&ConsultationSnapshot::default())?,
        )?;
        meta.insert(0, entry.clone());
        self.write_meta(&meta)?;
        debug!(id = %entry.id, "Session created");
        Ok(entry)
    }

    fn save(
        &self,
        id: &str,
        status: &str,
        snapshot: &ConsultationSnapshot,
    ) -> Result<(), StoreError> {
        let mut meta = self.read_meta()?;
        let Some(entry) = meta.iter_mut().find(|m| m.id == id) else {
            return Err(StoreError::NotFound(id.to_string()));
        };
        entry.status = status.to_string();
        entry.updated_at = Utc::now().to_rfc3339();

        fs::write(self.data_path(id), serde_json::to_string_pretty(snapshot)?)?;
        self.write_meta(&meta)
    }

    fn load(&self, id: &str) -> Result<ConsultationSnapshot, StoreError> {
        match fs::read_to_string(self.data_path(id)) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<SessionMeta>, StoreError> {
        self.read_meta()
    }

    fn rename(&self, id: &str, new_name: &str) -> Result<(), StoreError> {
        let mut meta = self.read_meta()?;
        let Some(entry) = meta.iter_mut().find(|m| m.id == id) else {
            return Err(StoreError::NotFound(id.to_string()));
        };
        entry.name = new_name.to_string();
        entry.updated_at = Utc::now().to_rfc3339();
        self.write_meta(&meta)
    }

    fn remove(&self, id: &str) -> Result<(), StoreError> {
        let mut meta = self.read_meta()?;
        let before = meta.len();
        meta.retain(|m| m.id != id);
        if meta.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.write_meta(&meta)?;
        // The index is authoritative; a missing data file is not an error
        let _ = fs::remove_file(self.data_path(id));
        Ok(())
    }
}
