//! Artifact Store (§4.15): screenshot persistence plus a JSON-line sidecar index.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{EngineError, Result};

/// Image encoding a screenshot was captured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG.
    Png,
    /// JPEG.
    Jpeg,
    /// WebP.
    Webp,
}

impl ImageFormat {
    /// File extension and MIME type for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
        }
    }

    /// The MIME type to report on the artifact record.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }
}

/// Caller-supplied metadata accompanying a screenshot write.
#[derive(Debug, Clone, Default)]
pub struct ArtifactMeta {
    /// Page URL at capture time.
    pub url: String,
    /// Page title at capture time.
    pub title: String,
    /// The DOM-path selector the screenshot was scoped to, if any.
    pub selector: Option<String>,
}

/// A persisted screenshot (§3 `Artifact`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// `ss-<YYYYMMDDhhmmss>-<6hex>`.
    pub id: String,
    /// Filename within the screenshot directory.
    pub filename: String,
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Image encoding.
    pub format: ImageFormat,
    /// MIME type matching `format`.
    pub mime_type: String,
    /// File size in bytes.
    pub size: u64,
    /// Page URL at capture time.
    pub url: String,
    /// Page title at capture time.
    pub title: String,
    /// The selector the screenshot was scoped to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// ISO-8601 capture timestamp.
    pub timestamp: String,
}

/// A small monotonic counter to keep ids distinct when two screenshots land in the same second.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Manages screenshots under a configured directory plus the JSON-line index that tracks them.
pub struct ArtifactStore {
    dir: PathBuf,
    index: HashMap<String, Artifact>,
}

impl ArtifactStore {
    /// Load the index file under `dir` (creating `dir` if missing), skipping any entry whose
    /// backing file no longer exists (§4.15 "startup: load the index, skipping missing files").
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` cannot be created or the index file exists but is unreadable.
    pub async fn load(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await.map_err(|e| EngineError::session_error(format!("{}: {e}", dir.display())))?;

        let mut index = HashMap::new();
        let index_path = index_file_path(&dir);
        if let Ok(contents) = fs::read_to_string(&index_path).await {
            for line in contents.lines().filter(|l| !l.trim().is_empty()) {
                let Ok(artifact) = serde_json::from_str::<Artifact>(line) else { continue };
                if fs::metadata(&artifact.path).await.is_ok() {
                    index.insert(artifact.id.clone(), artifact);
                }
            }
        }

        Ok(Self { dir, index })
    }

    /// Persist `bytes` as a new artifact, appending a line to the sidecar index.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or index cannot be written.
    pub async fn save(&mut self, bytes: &[u8], format: ImageFormat, meta: ArtifactMeta, timestamp: &str) -> Result<Artifact> {
        let id = generate_id(timestamp);
        let filename = format!("{id}.{}", format.extension());
        let path = self.dir.join(&filename);

        fs::write(&path, bytes).await.map_err(|e| EngineError::session_error(format!("{}: {e}", path.display())))?;

        let artifact = Artifact {
            id: id.clone(),
            filename,
            path,
            format,
            mime_type: format.mime_type().to_string(),
            size: bytes.len() as u64,
            url: meta.url,
            title: meta.title,
            selector: meta.selector,
            timestamp: timestamp.to_string(),
        };

        self.append_index_line(&artifact).await?;
        self.index.insert(id, artifact.clone());
        Ok(artifact)
    }

    /// Look up an artifact's metadata by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Artifact> {
        self.index.get(id)
    }

    /// Every artifact, newest first.
    #[must_use]
    pub fn list(&self) -> Vec<&Artifact> {
        let mut all: Vec<&Artifact> = self.index.values().collect();
        all.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        all
    }

    /// Read an artifact's bytes off disk, evicting it from the index if the file has vanished.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionError`] if the id is unknown or the file cannot be read.
    pub async fn read_file(&mut self, id: &str) -> Result<Vec<u8>> {
        let Some(artifact) = self.index.get(id) else {
            return Err(EngineError::session_error(format!("no artifact with id {id}")));
        };
        match fs::read(&artifact.path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                self.index.remove(id);
                Err(EngineError::session_error(format!("artifact {id} file missing: {e}")))
            }
        }
    }

    /// Delete an artifact's file and its index entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown.
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        let Some(artifact) = self.index.remove(id) else {
            return Err(EngineError::session_error(format!("no artifact with id {id}")));
        };
        let _ = fs::remove_file(&artifact.path).await;
        self.rewrite_index().await
    }

    /// Point the store at a new directory, discarding the in-memory index (§4.15
    /// `setScreenshotDir`). Callers should `load` a fresh store afterward if they need the new
    /// directory's existing entries.
    pub fn set_screenshot_dir(&mut self, dir: PathBuf) {
        self.dir = dir;
        self.index.clear();
    }

    /// The directory new screenshots are written under.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn append_index_line(&self, artifact: &Artifact) -> Result<()> {
        let line = serde_json::to_string(artifact).map_err(|e| EngineError::session_error(e.to_string()))?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(index_file_path(&self.dir))
            .await
            .map_err(|e| EngineError::session_error(e.to_string()))?;
        file.write_all(format!("{line}\n").as_bytes()).await.map_err(|e| EngineError::session_error(e.to_string()))?;
        Ok(())
    }

    async fn rewrite_index(&self) -> Result<()> {
        let mut lines = Vec::with_capacity(self.index.len());
        for artifact in self.index.values() {
            lines.push(serde_json::to_string(artifact).map_err(|e| EngineError::session_error(e.to_string()))?);
        }
        fs::write(index_file_path(&self.dir), format!("{}\n", lines.join("\n")))
            .await
            .map_err(|e| EngineError::session_error(e.to_string()))
    }
}

fn index_file_path(dir: &Path) -> PathBuf {
    dir.join("index.jsonl")
}

/// Build `ss-<YYYYMMDDhhmmss>-<6hex>` from an already-formatted ISO-8601 `timestamp` plus a
/// process-local sequence number, so two screenshots in the same second still get distinct ids.
fn generate_id(timestamp: &str) -> String {
    let compact: String = timestamp.chars().filter(|c| c.is_ascii_digit()).take(14).collect();

    let mut hasher = DefaultHasher::new();
    timestamp.hash(&mut hasher);
    SEQUENCE.fetch_add(1, Ordering::Relaxed).hash(&mut hasher);
    let hex = format!("{:06x}", hasher.finish() & 0x00FF_FFFF);

    format!("ss-{compact}-{hex}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_list_then_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ArtifactStore::load(dir.path().to_path_buf()).await.unwrap();

        let meta = ArtifactMeta { url: "https://example.com".into(), title: "t".into(), selector: None };
        let artifact = store.save(b"fake-png-bytes", ImageFormat::Png, meta, "20260101120000").await.unwrap();

        assert!(artifact.id.starts_with("ss-20260101120000-"));
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.read_file(&artifact.id).await.unwrap(), b"fake-png-bytes");

        store.delete(&artifact.id).await.unwrap();
        assert!(store.get(&artifact.id).is_none());
    }

    #[tokio::test]
    async fn load_skips_entries_with_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ArtifactStore::load(dir.path().to_path_buf()).await.unwrap();
        let meta = ArtifactMeta { url: "u".into(), title: "t".into(), selector: None };
        let artifact = store.save(b"bytes", ImageFormat::Png, meta, "20260101120000").await.unwrap();

        tokio::fs::remove_file(&artifact.path).await.unwrap();

        let reloaded = ArtifactStore::load(dir.path().to_path_buf()).await.unwrap();
        assert!(reloaded.get(&artifact.id).is_none());
    }
}
