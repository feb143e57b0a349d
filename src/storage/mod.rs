//! Per-request audio workspaces
//!
//! Every inbound audio event gets its own directory under the static root, so
//! concurrent requests never read or overwrite each other's files:
//!
//! ```text
//! <static_dir>/<request_id>/output.m4a       fetched voice message
//! <static_dir>/<request_id>/outputaudio.wav  synthesized reply audio
//! ```
//!
//! Output audio must stay reachable after the reply is sent, so workspaces are
//! removed by a periodic sweep rather than at the end of the request. The sweep
//! only touches directories named like a workspace ID, so other content under
//! the static root is left alone.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::config::StorageConfig;
use crate::{Error, Result};

/// File name of the fetched input audio inside a workspace
pub const INPUT_FILE_NAME: &str = "output.m4a";

/// File name of the synthesized audio inside a workspace
pub const OUTPUT_FILE_NAME: &str = "outputaudio.wav";

/// Hex digits in the random workspace ID suffix (simple-format UUID)
const WORKSPACE_SUFFIX_LEN: usize = 32;

/// Root directory holding request workspaces
#[derive(Debug, Clone)]
pub struct AudioStore {
    root: PathBuf,
}

/// Directory owned by a single pipeline run
#[derive(Debug)]
pub struct RequestWorkspace {
    id: String,
    dir: PathBuf,
}

impl AudioStore {
    /// Create a store rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if needed
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn ensure_root(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            Error::Storage(format!(
                "failed to create static dir {}: {e}",
                self.root.display()
            ))
        })
    }

    /// Create a fresh workspace for a message
    ///
    /// The workspace ID combines the sanitized message ID with a random suffix, so
    /// redelivered events do not collide either.
    ///
    /// # Errors
    ///
    /// Returns error if the message ID has no usable characters or the directory
    /// cannot be created
    pub fn workspace(&self, message_id: &str) -> Result<RequestWorkspace> {
        let prefix: String = message_id
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .take(64)
            .collect();
        if prefix.is_empty() {
            return Err(Error::Storage(format!(
                "message id {message_id:?} cannot name a workspace"
            )));
        }

        let id = format!("{prefix}-{}", uuid::Uuid::new_v4().simple());
        let dir = self.root.join(&id);
        std::fs::create_dir_all(&dir).map_err(|e| {
            Error::Storage(format!("failed to create workspace {}: {e}", dir.display()))
        })?;

        tracing::debug!(workspace = %id, "created request workspace");
        Ok(RequestWorkspace { id, dir })
    }

    /// Delete workspaces last modified more than `max_age` ago
    ///
    /// Plain files and directories not named like a workspace are left alone.
    /// Returns the number of workspaces removed. Blocks on filesystem IO.
    ///
    /// # Errors
    ///
    /// Returns error if the root directory cannot be listed
    pub fn sweep_expired(&self, max_age: Duration) -> Result<usize> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let now = SystemTime::now();
        let mut removed = 0;

        for entry in entries.flatten() {
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_dir() || !is_workspace_name(&entry.file_name().to_string_lossy()) {
                continue;
            }

            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .unwrap_or_default();
            if age < max_age {
                continue;
            }

            match std::fs::remove_dir_all(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(
                    path = %entry.path().display(),
                    error = %e,
                    "failed to remove expired workspace"
                ),
            }
        }

        Ok(removed)
    }
}

/// Whether a directory name has the `<prefix>-<32 hex>` shape of a workspace ID
fn is_workspace_name(name: &str) -> bool {
    let Some((prefix, suffix)) = name.rsplit_once('-') else {
        return false;
    };
    !prefix.is_empty()
        && prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        && suffix.len() == WORKSPACE_SUFFIX_LEN
        && suffix
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, 'a'..='f'))
}

impl RequestWorkspace {
    /// Workspace identifier, also its directory name under the static root
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Workspace directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Canonical input audio path
    #[must_use]
    pub fn input_path(&self) -> PathBuf {
        self.dir.join(INPUT_FILE_NAME)
    }

    /// Canonical output audio path
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.dir.join(OUTPUT_FILE_NAME)
    }

    /// Output path relative to the static root, using `/` separators
    #[must_use]
    pub fn output_static_path(&self) -> String {
        format!("{}/{OUTPUT_FILE_NAME}", self.id)
    }

    /// Write fetched audio to the canonical input path
    ///
    /// Data goes to a temporary file in the workspace first and is then renamed
    /// over the canonical name; a pre-existing file is deleted when the rename
    /// refuses to replace it. Runs on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns error if the temporary file cannot be written, or the existing file
    /// cannot be deleted, or the rename fails
    pub async fn persist_input(&self, data: Vec<u8>) -> Result<PathBuf> {
        let dir = self.dir.clone();
        let target = self.input_path();

        let bytes = data.len();
        let path = tokio::task::spawn_blocking(move || persist_atomically(&dir, &target, &data))
            .await
            .map_err(|e| Error::Storage(format!("persist task failed: {e}")))??;

        tracing::debug!(path = %path.display(), bytes, "stored input audio");
        Ok(path)
    }

    /// Delete the input audio, ignoring a missing file
    pub async fn remove_input(&self) {
        let path = self.input_path();
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove input audio");
            }
        }
    }
}

/// Temp file in `dir`, then rename onto `target`
fn persist_atomically(dir: &Path, target: &Path, data: &[u8]) -> Result<PathBuf> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| Error::Storage(format!("failed to create temp file: {e}")))?;
    tmp.write_all(data)
        .and_then(|()| tmp.flush())
        .map_err(|e| Error::Storage(format!("failed to write temp file: {e}")))?;

    match tmp.persist(target) {
        Ok(_) => {}
        Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
            std::fs::remove_file(target).map_err(|err| {
                Error::Storage(format!("failed to delete {}: {err}", target.display()))
            })?;
            e.file.persist(target).map_err(|err| {
                Error::Storage(format!("failed to rename to {}: {}", target.display(), err.error))
            })?;
        }
        Err(e) => {
            return Err(Error::Storage(format!(
                "failed to rename to {}: {}",
                target.display(),
                e.error
            )));
        }
    }

    Ok(target.to_path_buf())
}

/// Run the workspace sweep in a background task
#[must_use]
pub fn spawn_sweeper(store: AudioStore, config: StorageConfig) -> tokio::task::JoinHandle<()> {
    let max_age = Duration::from_secs(config.retention_secs);
    let period = Duration::from_secs(config.sweep_interval_secs.max(1));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let sweep_store = store.clone();
            match tokio::task::spawn_blocking(move || sweep_store.sweep_expired(max_age)).await {
                Ok(Ok(0)) => {}
                Ok(Ok(removed)) => tracing::info!(removed, "swept expired workspaces"),
                Ok(Err(e)) => tracing::warn!(error = %e, "workspace sweep failed"),
                Err(e) => tracing::warn!(error = %e, "workspace sweep task failed"),
            }
        }
    })
}
