//! Per-network sync checkpoint persistence.
//!
//! Each network directory contains a `checkpoint.json` recording the last
//! fully-projected block number so that subsequent runs only fetch the
//! delta. Entity writes for a block always land before the checkpoint
//! advances past it, so a crash re-processes at most one window; the
//! projections are idempotent, so re-processing is harmless.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Sync progress for a single network.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Checkpoint {
    /// The last block whose events have been fully projected.
    pub last_block: u64,
    /// Unix timestamp (seconds) of the last successful sync.
    pub synced_at: u64,
}

impl Checkpoint {
    /// Create a checkpoint at the given block with the current timestamp.
    #[must_use]
    pub fn now(last_block: u64) -> Self {
        let synced_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            last_block,
            synced_at,
        }
    }

    /// Read the checkpoint from `<dir>/checkpoint.json`.
    ///
    /// Returns `None` if the file does not exist (first sync) or contains
    /// invalid JSON (logs a warning and triggers a fresh sync).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read (I/O error).
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join("checkpoint.json");
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        match serde_json::from_str::<Self>(&data) {
            Ok(checkpoint) => Ok(Some(checkpoint)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupted checkpoint, starting fresh");
                Ok(None)
            }
        }
    }

    /// Persist the checkpoint to `<dir>/checkpoint.json` atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

        let path = dir.join("checkpoint.json");
        let tmp = dir.join("checkpoint.json.tmp");

        std::fs::write(&tmp, serde_json::to_string_pretty(self)?.as_bytes())
            .with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("renaming {} -> {}", tmp.display(), path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = std::env::temp_dir().join(format!("eigenda-checkpoint-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        assert!(Checkpoint::load(&dir).unwrap().is_none());

        Checkpoint::now(1_234_567).save(&dir).unwrap();
        let loaded = Checkpoint::load(&dir).unwrap().unwrap();
        assert_eq!(loaded.last_block, 1_234_567);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn corrupted_file_starts_fresh() {
        let dir = std::env::temp_dir().join(format!("eigenda-checkpoint-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("checkpoint.json"), b"not json").unwrap();

        assert!(Checkpoint::load(&dir).unwrap().is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
