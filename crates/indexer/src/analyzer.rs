use crate::error::{IndexerError, Result};
use crate::report::AnalysisReport;
use crate::scanner::FileScanner;
use codechunk_code_chunker::{flatten_chunks, CodeChunk, Language, ParserRegistry};
use codechunk_protocol::{paginate, ChunkResponse, FunctionSummary};
use codechunk_store::{hash_bytes, CacheConfig, ChunkStore, FileMetadataStore, MemoryCache};
use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};

type PathLocks = std::sync::Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>;

/// Lazily consistent view over a project's chunks.
///
/// Every read first re-hashes the owning file and re-parses it when it
/// changed, so callers never see content from a stale file.
pub struct ProjectAnalyzer {
    config: CacheConfig,
    registry: ParserRegistry,
    cache: Arc<MemoryCache>,
    metadata: FileMetadataStore,
    /// Held for writing by the bulk sweep, which wipes the cache directory.
    sweep: RwLock<()>,
    /// Single-flight guard per source file.
    file_locks: PathLocks,
}

impl ProjectAnalyzer {
    pub fn new(config: CacheConfig, registry: ParserRegistry) -> Self {
        let config = config.normalized();
        let store = ChunkStore::new(&config.cache_dir);
        let cache = Arc::new(MemoryCache::new(store, config.memory_capacity));
        let metadata = FileMetadataStore::new(&config.cache_dir, cache.clone());
        Self {
            config,
            registry,
            cache,
            metadata,
            sweep: RwLock::new(()),
            file_locks: std::sync::Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn cache(&self) -> &MemoryCache {
        &self.cache
    }

    pub fn metadata(&self) -> &FileMetadataStore {
        &self.metadata
    }

    /// Wipe the cache and parse every supported file under `root`.
    ///
    /// A file that fails to parse is logged, recorded in the report and
    /// skipped; the sweep itself only fails for an invalid root.
    pub async fn analyze_project(&self, root: impl AsRef<Path>) -> Result<AnalysisReport> {
        let root = absolute(root.as_ref());
        if !root.is_dir() {
            return Err(IndexerError::InvalidPath(format!(
                "Not a directory: {}",
                root.display()
            )));
        }

        let _sweep = self.sweep.write().await;
        let started = Instant::now();
        log::info!("Analyzing project {}", root.display());

        self.cache.clear().await;
        self.metadata.reset().await;

        let mut report = AnalysisReport::new(root.to_string_lossy());
        let files = FileScanner::new(&root).scan(|path| self.registry.supports(path));
        for file in files {
            match self.analyze_file_unlocked(&file).await {
                Ok(count) => report.add_file(Language::from_path(&file).as_str(), count),
                Err(err) => {
                    log::warn!("Failed to analyze {}: {err}", file.display());
                    report.add_error(format!("{}: {err}", file.display()));
                }
            }
        }

        report.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        log::info!(
            "Analyzed {} files ({} chunks, {} errors) in {}ms",
            report.files,
            report.chunks,
            report.errors.len(),
            report.elapsed_ms
        );
        Ok(report)
    }

    /// Parse one file and store its flattened chunks. Returns the chunk count.
    pub async fn analyze_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = absolute(path.as_ref());
        let _sweep = self.sweep.read().await;
        let lock = self.file_lock(&path);
        let result = {
            let _guard = lock.lock().await;
            self.analyze_file_unlocked(&path).await
        };
        self.release_file_lock(&path, lock);
        result
    }

    async fn analyze_file_unlocked(&self, path: &Path) -> Result<usize> {
        let parser = self.registry.parser_for_path(path)?;
        let key = path_key(path);
        // Hash before parsing so an edit racing the parse is seen next time.
        let bytes = tokio::fs::read(path).await?;
        let hash = hash_bytes(&bytes);

        let tree = parser.parse_file(path).await?;
        let chunks = flatten_chunks(&tree);

        let mut seen = HashSet::new();
        let ids: Vec<String> = chunks
            .iter()
            .filter(|c| seen.insert(c.id.clone()))
            .map(|c| c.id.clone())
            .collect();

        let previous = self.metadata.get(&key).await;
        self.metadata.update(&key, &hash, ids.clone()).await;
        for chunk in &chunks {
            self.cache.set(&chunk.id, chunk.clone()).await;
        }
        if let Some(previous) = previous {
            for stale in previous.chunk_ids.iter().filter(|id| !seen.contains(*id)) {
                self.cache.delete(stale).await;
            }
        }

        log::debug!("Stored {} chunks for {key}", chunks.len());
        Ok(chunks.len())
    }

    /// Re-parse `path` if its content changed since the last parse; forget it
    /// if it no longer exists.
    pub async fn ensure_latest(&self, path: impl AsRef<Path>) {
        let path = absolute(path.as_ref());
        let _sweep = self.sweep.read().await;
        self.ensure_latest_unlocked(&path).await;
    }

    async fn ensure_latest_unlocked(&self, path: &Path) {
        let lock = self.file_lock(path);
        {
            let _guard = lock.lock().await;
            self.refresh(path).await;
        }
        self.release_file_lock(path, lock);
    }

    async fn refresh(&self, path: &Path) {
        let key = path_key(path);
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::debug!("{key} is gone, dropping its chunks");
                self.metadata.clear_for_file(&key).await;
                return;
            }
            Err(err) => {
                log::warn!("Failed to read {key}, keeping cached chunks: {err}");
                return;
            }
        };

        if !self.metadata.is_changed(&key, &hash_bytes(&bytes)).await {
            return;
        }
        log::info!("{key} changed, re-parsing");
        self.metadata.clear_for_file(&key).await;
        if let Err(err) = self.analyze_file_unlocked(path).await {
            log::warn!("Failed to re-analyze {key}: {err}");
        }
    }

    /// Chunk `id`, refreshed against its file and paginated when it is larger
    /// than the page size or a page token is given.
    pub async fn get_chunk(
        &self,
        id: &str,
        page_size: Option<usize>,
        page_token: Option<&str>,
    ) -> Option<ChunkResponse> {
        let _sweep = self.sweep.read().await;
        let known = self.cache.get(id).await?;
        self.ensure_latest_unlocked(&absolute(Path::new(&known.file_path)))
            .await;
        let chunk = self.cache.get(id).await?;
        Some(self.respond(&chunk, page_size, page_token))
    }

    /// Function-like chunks of `path`, ordered by start line
    pub async fn list_functions_in_file(&self, path: impl AsRef<Path>) -> Vec<FunctionSummary> {
        let path = absolute(path.as_ref());
        let _sweep = self.sweep.read().await;
        self.ensure_latest_unlocked(&path).await;
        self.functions_of(&path)
            .await
            .iter()
            .map(FunctionSummary::from)
            .collect()
    }

    /// Functions of `path` whose signature contains `query`
    pub async fn find_functions(
        &self,
        path: impl AsRef<Path>,
        query: &str,
    ) -> Vec<FunctionSummary> {
        let path = absolute(path.as_ref());
        let _sweep = self.sweep.read().await;
        self.ensure_latest_unlocked(&path).await;
        self.functions_of(&path)
            .await
            .iter()
            .filter(|chunk| chunk.signature.contains(query))
            .map(FunctionSummary::from)
            .collect()
    }

    /// The chunk of `path` with exactly `signature`
    pub async fn get_function_chunk(
        &self,
        path: impl AsRef<Path>,
        signature: &str,
        page_size: Option<usize>,
        page_token: Option<&str>,
    ) -> Option<ChunkResponse> {
        let path = absolute(path.as_ref());
        let _sweep = self.sweep.read().await;
        self.ensure_latest_unlocked(&path).await;
        let chunk = self
            .chunks_of(&path)
            .await
            .into_iter()
            .find(|chunk| chunk.signature == signature)?;
        Some(self.respond(&chunk, page_size, page_token))
    }

    /// Every key currently persisted in the chunk store
    pub async fn list_chunk_ids(&self) -> Vec<String> {
        let _sweep = self.sweep.read().await;
        self.cache.store().list_keys().await
    }

    fn respond(
        &self,
        chunk: &CodeChunk,
        page_size: Option<usize>,
        page_token: Option<&str>,
    ) -> ChunkResponse {
        let page_size = page_size
            .unwrap_or(self.config.default_page_size)
            .max(1);
        let total_lines = chunk.content.split('\n').count();
        if page_token.is_some() || total_lines > page_size {
            paginate(chunk, page_size, page_token)
        } else {
            ChunkResponse::whole(chunk)
        }
    }

    /// Stored chunks recorded for `path` that still claim it as their file
    async fn chunks_of(&self, path: &Path) -> Vec<CodeChunk> {
        let key = path_key(path);
        let Some(meta) = self.metadata.get(&key).await else {
            return Vec::new();
        };
        let mut chunks = Vec::with_capacity(meta.chunk_ids.len());
        for id in &meta.chunk_ids {
            if let Some(chunk) = self.cache.get(id).await {
                if chunk.file_path == key {
                    chunks.push(chunk);
                }
            }
        }
        chunks
    }

    async fn functions_of(&self, path: &Path) -> Vec<CodeChunk> {
        let mut functions: Vec<CodeChunk> = self
            .chunks_of(path)
            .await
            .into_iter()
            .filter(CodeChunk::is_callable)
            .collect();
        functions.sort_by_key(|chunk| chunk.start_line);
        functions
    }

    fn file_lock(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self
            .file_locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        locks.entry(path.to_path_buf()).or_default().clone()
    }

    fn release_file_lock(&self, path: &Path, lock: Arc<Mutex<()>>) {
        let mut locks = self
            .file_locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // map + this handle: nobody else is waiting
        if Arc::strong_count(&lock) == 2 {
            locks.remove(path);
        }
    }
}

impl std::fmt::Debug for ProjectAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectAnalyzer")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
