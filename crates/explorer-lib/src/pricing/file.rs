//! Pricing rate persisted as a JSON file

use super::{PricingRate, PricingStore, RateUpdate};
use crate::error::PricingError;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Pricing store backed by a single JSON document
///
/// Writes go to a temporary sibling file that is then renamed over the
/// target, so readers see either the old rate or the new one.
#[derive(Debug)]
pub struct JsonFilePricingStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFilePricingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save_to_disk(&self, rate: &PricingRate) -> Result<(), PricingError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| PricingError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let json = serde_json::to_vec_pretty(rate)?;

        let temp_path = self.path.with_extension("tmp");
        let write_err = |source: std::io::Error| PricingError::Write {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(write_err)?;
        file.write_all(&json).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;

        std::fs::rename(&temp_path, &self.path).map_err(write_err)?;

        Ok(())
    }
}

impl PricingStore for JsonFilePricingStore {
    fn read(&self) -> PricingRate {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No pricing file, using default rate");
                return PricingRate::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read pricing file, using default rate");
                return PricingRate::default();
            }
        };

        match serde_json::from_slice::<PricingRate>(&bytes) {
            Ok(rate) if rate.is_valid() => rate,
            Ok(rate) => {
                warn!(
                    path = %self.path.display(),
                    per_cpu_core = rate.per_cpu_core,
                    per_memory_gb = rate.per_memory_gb,
                    "Stored pricing rate is not positive, using default rate"
                );
                PricingRate::default()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Unparseable pricing file, using default rate");
                PricingRate::default()
            }
        }
    }

    fn write(&self, update: &RateUpdate, updated_by: &str) -> Result<PricingRate, PricingError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let rate = PricingRate::from_update(update, updated_by);
        self.save_to_disk(&rate)?;

        debug!(
            path = %self.path.display(),
            per_cpu_core = rate.per_cpu_core,
            per_memory_gb = rate.per_memory_gb,
            "Pricing rate saved"
        );

        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::RateInput;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_default() {
        let dir = TempDir::new().unwrap();
        let store = JsonFilePricingStore::new(dir.path().join("price.json"));

        let rate = store.read();
        assert!(rate.is_default);
        assert_eq!(rate.per_cpu_core, 0.03465);
        assert_eq!(rate.per_memory_gb, 0.003938);
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("price.json");
        let store = JsonFilePricingStore::new(&path);

        let saved = store
            .write(&RateUpdate::new(0.05, 0.004).unwrap(), "admin")
            .unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let rate = store.read();
        assert_eq!(rate, saved);
        assert_eq!(rate.per_cpu_core, 0.05);
        assert_eq!(rate.per_memory_gb, 0.004);
        assert!(!rate.is_default);
        assert_eq!(rate.updated_by.as_deref(), Some("admin"));
    }

    #[test]
    fn test_rejected_update_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("price.json");
        let store = JsonFilePricingStore::new(&path);

        let err = RateUpdate::parse(&RateInput::from("-1"), &RateInput::from("0.004")).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(!path.exists());

        let rate = store.read();
        assert!(rate.is_default);
        assert_eq!(rate.per_cpu_core, 0.03465);
    }

    #[test]
    fn test_reads_file_in_stored_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("price.json");
        std::fs::write(
            &path,
            r#"{"default":false,"per_cpu_core":0.05,"per_memory_gb":0.004,"updated_at":"2024-01-01 10:00:00","updated_by":"Admin"}"#,
        )
        .unwrap();

        let rate = JsonFilePricingStore::new(&path).read();
        assert_eq!(rate.per_cpu_core, 0.05);
        assert_eq!(rate.updated_at.as_deref(), Some("2024-01-01 10:00:00"));
    }

    #[test]
    fn test_corrupt_or_invalid_file_reads_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("price.json");
        let store = JsonFilePricingStore::new(&path);

        std::fs::write(&path, b"{not json").unwrap();
        assert!(store.read().is_default);

        std::fs::write(&path, r#"{"per_cpu_core":-1,"per_memory_gb":0.004}"#).unwrap();
        assert!(store.read().is_default);
    }

    #[test]
    fn test_unwritable_location_is_reported() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();

        let store = JsonFilePricingStore::new(blocker.join("price.json"));
        let err = store
            .write(&RateUpdate::new(0.05, 0.004).unwrap(), "admin")
            .unwrap_err();
        assert!(matches!(err, PricingError::CreateDir { .. }));
        assert!(!err.is_invalid_input());
        assert!(store.read().is_default);
    }
}
