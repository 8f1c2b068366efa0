use crate::error::Result;
use crate::memory::MemoryCache;
use crate::store::METADATA_FILE_NAME;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

/// What was produced the last time a file was parsed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub hash: String,
    /// Unix milliseconds
    pub last_parsed: u64,
    /// Every chunk id the parse produced; the deletion manifest for the file
    pub chunk_ids: Vec<String>,
}

type Document = BTreeMap<String, FileMetadata>;

/// Per-file hash and chunk manifest, persisted as one `metadata.json`.
///
/// The document is loaded on first use. Every mutation re-reads the file,
/// applies the change and rewrites it atomically.
#[derive(Debug)]
pub struct FileMetadataStore {
    path: PathBuf,
    cache: Arc<MemoryCache>,
    loaded: Mutex<Option<Document>>,
}

impl FileMetadataStore {
    pub fn new(cache_dir: &Path, cache: Arc<MemoryCache>) -> Self {
        Self {
            path: cache_dir.join(METADATA_FILE_NAME),
            cache,
            loaded: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when `path` was never recorded or its hash differs
    pub async fn is_changed(&self, path: &str, current_hash: &str) -> bool {
        self.get(path)
            .await
            .map_or(true, |meta| meta.hash != current_hash)
    }

    pub async fn get(&self, path: &str) -> Option<FileMetadata> {
        let mut guard = self.loaded.lock().await;
        if guard.is_none() {
            *guard = Some(self.read_document().await);
        }
        guard.as_ref().and_then(|doc| doc.get(path).cloned())
    }

    /// Recorded file paths, sorted
    pub async fn tracked_files(&self) -> Vec<String> {
        let mut guard = self.loaded.lock().await;
        if guard.is_none() {
            *guard = Some(self.read_document().await);
        }
        guard
            .as_ref()
            .map(|doc| doc.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Upsert the record for `path`, replacing its manifest
    pub async fn update(&self, path: &str, hash: &str, chunk_ids: Vec<String>) {
        let record = FileMetadata {
            hash: hash.to_string(),
            last_parsed: unix_millis(),
            chunk_ids,
        };
        let mut guard = self.loaded.lock().await;
        let mut doc = self.read_document().await;
        doc.insert(path.to_string(), record);
        if let Err(err) = self.write_document(&doc).await {
            log::warn!("Failed to write {}: {err}", self.path.display());
        }
        *guard = Some(doc);
    }

    /// Delete every chunk recorded for `path`, then forget the file
    pub async fn clear_for_file(&self, path: &str) {
        let mut guard = self.loaded.lock().await;
        let mut doc = self.read_document().await;
        let Some(record) = doc.remove(path) else {
            *guard = Some(doc);
            return;
        };
        for id in &record.chunk_ids {
            self.cache.delete(id).await;
        }
        log::debug!("Cleared {} chunks for {path}", record.chunk_ids.len());
        if let Err(err) = self.write_document(&doc).await {
            log::warn!("Failed to write {}: {err}", self.path.display());
        }
        *guard = Some(doc);
    }

    /// Drop the in-memory copy; the next access reloads from disk
    pub async fn reset(&self) {
        *self.loaded.lock().await = None;
    }

    async fn read_document(&self) -> Document {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Document::new(),
            Err(err) => {
                log::warn!("Failed to read {}: {err}", self.path.display());
                return Document::new();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(doc) => doc,
            Err(err) => {
                log::warn!(
                    "Corrupt {}, starting from an empty document: {err}",
                    self.path.display()
                );
                Document::new()
            }
        }
    }

    async fn write_document(&self, doc: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(doc)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(err) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        Ok(())
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
