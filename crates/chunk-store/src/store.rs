use crate::error::Result;
use codechunk_code_chunker::CodeChunk;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const CHUNK_SCHEMA_VERSION: u32 = 1;

/// Reserved file name of the per-file metadata document
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Prefix of every chunk file; keeps chunk names apart from [`METADATA_FILE_NAME`]
const CHUNK_FILE_PREFIX: &str = "chunk-";

const TMP_SUFFIX: &str = ".tmp";

/// On-disk record: the chunk plus the exact key it was stored under
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChunkRecord {
    schema_version: u32,
    key: String,
    chunk: CodeChunk,
}

/// Durable chunk persistence, one JSON file per key.
///
/// Failures never surface to callers: writes are logged and dropped, reads
/// degrade to a miss.
#[derive(Debug, Clone)]
pub struct ChunkStore {
    dir: PathBuf,
}

impl ChunkStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`: `chunk-<key>.json`, every char outside
    /// `[A-Za-z0-9._-]` replaced by `_`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{CHUNK_FILE_PREFIX}{}.json", safe_component(key)))
    }

    pub async fn put(&self, key: &str, chunk: &CodeChunk) {
        if let Err(err) = self.try_put(key, chunk).await {
            log::warn!("Failed to persist chunk '{key}': {err}");
        }
    }

    async fn try_put(&self, key: &str, chunk: &CodeChunk) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let record = ChunkRecord {
            schema_version: CHUNK_SCHEMA_VERSION,
            key: key.to_string(),
            chunk: chunk.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&record)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(err) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        Ok(())
    }

    pub async fn get(&self, key: &str) -> Option<CodeChunk> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                log::warn!("Failed to read chunk '{key}' from {}: {err}", path.display());
                return None;
            }
        };
        let record: ChunkRecord = match serde_json::from_slice(&bytes) {
            Ok(record) => record,
            Err(err) => {
                log::warn!("Corrupt chunk record {}: {err}", path.display());
                return None;
            }
        };
        if record.key != key {
            log::debug!(
                "Chunk file {} belongs to '{}', not '{key}'",
                path.display(),
                record.key
            );
            return None;
        }
        Some(record.chunk)
    }

    pub async fn delete(&self, key: &str) {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => log::warn!("Failed to delete chunk '{key}': {err}"),
        }
    }

    /// Keys of every stored chunk, sorted
    pub async fn list_keys(&self) -> Vec<String> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                log::warn!("Failed to list {}: {err}", self.dir.display());
                return Vec::new();
            }
        };

        let mut keys = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    log::warn!("Failed to list {}: {err}", self.dir.display());
                    break;
                }
            };
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !name.starts_with(CHUNK_FILE_PREFIX)
                || name.ends_with(TMP_SUFFIX)
                || !name.ends_with(".json")
            {
                continue;
            }
            let Ok(bytes) = tokio::fs::read(entry.path()).await else {
                continue;
            };
            match serde_json::from_slice::<ChunkRecord>(&bytes) {
                Ok(record) => keys.push(record.key),
                Err(err) => log::debug!("Skipping unreadable chunk file {name}: {err}"),
            }
        }
        keys.sort();
        keys
    }

    /// Remove the whole cache directory
    pub async fn clear(&self) {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => log::debug!("Cleared chunk cache {}", self.dir.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => log::warn!("Failed to clear {}: {err}", self.dir.display()),
        }
    }
}

pub(crate) fn safe_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() {
        "_".to_string()
    } else {
        out
    }
}
