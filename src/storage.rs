//! Local filesystem side channel for crypto payment proofs.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

static UNSAFE_FILE_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9._-]").unwrap());

const FALLBACK_FILE_NAME: &str = "proof";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create upload directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),
    #[error("Failed to save file {0}: {1}")]
    Write(PathBuf, std::io::Error),
}

#[derive(Clone, Debug)]
pub struct ProofStore {
    root: PathBuf,
}

impl ProofStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn user_dir(&self, user_id: i32) -> PathBuf {
        self.root.join("payments").join(user_id.to_string())
    }

    /// Writes the proof as `<root>/payments/<user_id>/<order_id>_<file name>` and
    /// returns that path. The bytes land in a temporary file first, so a reader
    /// never sees a partial proof.
    pub async fn save(
        &self,
        user_id: i32,
        order_id: i32,
        original_name: &str,
        data: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let dir = self.user_dir(user_id);
        fs::create_dir_all(&dir)
            .await
            .map_err(|err| StorageError::CreateDir(dir.clone(), err))?;

        let path = dir.join(format!("{order_id}_{}", sanitize_file_name(original_name)));
        let partial = dir.join(format!(".{}.part", Uuid::new_v4()));

        if let Err(err) = fs::write(&partial, data).await {
            let _ = fs::remove_file(&partial).await;
            return Err(StorageError::Write(path, err));
        }
        if let Err(err) = fs::rename(&partial, &path).await {
            let _ = fs::remove_file(&partial).await;
            return Err(StorageError::Write(path, err));
        }

        Ok(path)
    }

    pub async fn remove(&self, path: &Path) {
        if let Err(err) = fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %err, "Failed to remove payment proof");
        }
    }
}

/// Keeps only the last path component and replaces anything outside
/// `[a-zA-Z0-9._-]` with `_`.
pub fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim_start_matches('.');

    let cleaned = UNSAFE_FILE_NAME_CHARS.replace_all(base, "_");
    if cleaned.is_empty() {
        FALLBACK_FILE_NAME.to_owned()
    } else {
        cleaned.into_owned()
    }
}
