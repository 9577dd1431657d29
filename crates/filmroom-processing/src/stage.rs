//! Temporary stage store
//!
//! Manages the ephemeral local copies of a request's video blobs. Filenames
//! embed the per-request UUID, which makes every staged path unique for the
//! process lifetime and lets concurrent uploads share one directory without
//! coordination. Removal is best-effort and idempotent: a missing file is a
//! success, and real failures are logged, never escalated.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// A filesystem-resident blob owned by a single ingestion request.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub id: Uuid,
    pub path: PathBuf,
}

/// Stage store over a single base directory.
#[derive(Debug, Clone)]
pub struct StageStore {
    base_dir: PathBuf,
}

impl StageStore {
    /// Create a stage store, creating the base directory if needed.
    pub async fn new(base_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).await?;
        Ok(StageStore { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Write `data` to a fresh staged file named `{id}_{hint}`.
    pub async fn stage(&self, id: Uuid, data: &[u8], name_hint: &str) -> io::Result<StagedFile> {
        let path = self.base_dir.join(format!("{}_{}", id, sanitize(name_hint)));
        fs::write(&path, data).await?;

        tracing::debug!(
            id = %id,
            path = %path.display(),
            size_bytes = data.len(),
            "Staged upload to local file"
        );

        Ok(StagedFile { id, path })
    }

    /// Remove a staged path, best-effort.
    ///
    /// Removing a nonexistent path is not an error; any other failure is
    /// logged and swallowed so cleanup never turns a finished request into
    /// a failure.
    pub async fn remove(&self, path: &Path) {
        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed staged file");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %path.display(),
                    "Failed to remove staged file"
                );
            }
        }
    }
}

/// Keep hints filename-safe: strip anything that could change the directory.
fn sanitize(hint: &str) -> String {
    hint.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_stage_embeds_id_in_path() {
        let dir = tempdir().unwrap();
        let store = StageStore::new(dir.path()).await.unwrap();

        let id = Uuid::new_v4();
        let staged = store.stage(id, b"video bytes", "input.mp4").await.unwrap();

        assert!(staged
            .path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .contains(&id.to_string()));
        assert_eq!(fs::read(&staged.path).await.unwrap(), b"video bytes");
    }

    #[tokio::test]
    async fn test_stage_distinct_ids_never_collide() {
        let dir = tempdir().unwrap();
        let store = StageStore::new(dir.path()).await.unwrap();

        let a = store
            .stage(Uuid::new_v4(), b"a", "input.mp4")
            .await
            .unwrap();
        let b = store
            .stage(Uuid::new_v4(), b"b", "input.mp4")
            .await
            .unwrap();

        assert_ne!(a.path, b.path);
        assert_eq!(fs::read(&a.path).await.unwrap(), b"a");
        assert_eq!(fs::read(&b.path).await.unwrap(), b"b");
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = StageStore::new(dir.path()).await.unwrap();

        let staged = store
            .stage(Uuid::new_v4(), b"video bytes", "input.mp4")
            .await
            .unwrap();

        store.remove(&staged.path).await;
        assert!(!staged.path.exists());

        // Second removal of the same path is fine.
        store.remove(&staged.path).await;
    }

    #[tokio::test]
    async fn test_remove_nonexistent_path_is_ok() {
        let dir = tempdir().unwrap();
        let store = StageStore::new(dir.path()).await.unwrap();

        store.remove(&dir.path().join("never-existed.mp4")).await;
    }

    #[test]
    fn test_sanitize_strips_path_separators() {
        assert_eq!(sanitize("input.mp4"), "input.mp4");
        assert_eq!(sanitize("../../etc/passwd"), ".._.._etc_passwd");
    }
}
