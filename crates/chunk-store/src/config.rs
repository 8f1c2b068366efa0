use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CACHE_DIR: &str = ".codechunk/chunks";
pub const DEFAULT_MEMORY_CAPACITY: usize = 100;
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Where and how chunks are cached
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheConfig {
    /// Directory holding one JSON file per chunk plus `metadata.json`
    pub cache_dir: PathBuf,

    /// Maximum number of chunks kept in memory
    pub memory_capacity: usize,

    /// Lines per page when a caller does not pass a page size
    pub default_page_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl CacheConfig {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `CODECHUNK_CACHE_DIR`, `CODECHUNK_MEMORY_CAPACITY`
    /// and `CODECHUNK_PAGE_SIZE`. Unparseable numbers are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = env_value("CODECHUNK_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(capacity) = env_usize("CODECHUNK_MEMORY_CAPACITY") {
            config.memory_capacity = capacity;
        }
        if let Some(size) = env_usize("CODECHUNK_PAGE_SIZE") {
            config.default_page_size = size;
        }
        config.normalized()
    }

    #[must_use]
    pub fn with_memory_capacity(mut self, capacity: usize) -> Self {
        self.memory_capacity = capacity;
        self.normalized()
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.default_page_size = page_size;
        self.normalized()
    }

    /// Clamp capacities and page size to at least 1
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.memory_capacity = self.memory_capacity.max(1);
        self.default_page_size = self.default_page_size.max(1);
        self
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_usize(key: &str) -> Option<usize> {
    let raw = env_value(key)?;
    match raw.parse::<usize>() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Ignoring {key}={raw}: not a positive integer");
            None
        }
    }
}
