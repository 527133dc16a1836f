use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::domain::Watermark;
use crate::errors::{FeederError, FeederResult};
use crate::storage::traits::WatermarkStore;

/// Keeps the watermark as a bare hex string in a single file.
pub struct FileWatermarkStore {
    path: PathBuf,
}

impl FileWatermarkStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forget the stored watermark. Returns whether a file was removed.
    pub fn clear(&self) -> FeederResult<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FeederError::Persist(format!(
                "cannot remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

impl WatermarkStore for FileWatermarkStore {
    /// Missing, unreadable and corrupt files all read as the epoch
    fn load(&self) -> FeederResult<Watermark> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Watermark::EPOCH),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read watermark, starting from epoch");
                return Ok(Watermark::EPOCH);
            }
        };

        match Watermark::decode(&raw) {
            Ok(watermark) => Ok(watermark),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt watermark, starting from epoch");
                Ok(Watermark::EPOCH)
            }
        }
    }

    fn save(&self, watermark: Watermark) -> FeederResult<()> {
        let persist_err =
            |e: std::io::Error| FeederError::Persist(format!("{}: {}", self.path.display(), e));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(persist_err)?;
            }
        }

        fs::write(&self.path, watermark.encode()).map_err(persist_err)
    }
}
