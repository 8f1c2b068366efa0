//! # Codechunk Store
//!
//! Two-tier chunk cache plus per-file change tracking.
//!
//! ## Architecture
//!
//! ```text
//! MemoryCache (LRU, bounded)
//!     │  write-through / read-fallback
//!     ▼
//! ChunkStore  <cache_dir>/<safe(key)>.json   {schemaVersion, key, chunk}
//!
//! FileMetadataStore  <cache_dir>/metadata.json
//!     { "<file path>": { hash, lastParsed, chunkIds } }
//!     │
//!     └─> clear_for_file: delete every manifest id through MemoryCache
//! ```
//!
//! Store failures are logged and degrade to a miss; they never reach callers.

pub mod config;
pub mod error;
pub mod hash;
pub mod memory;
pub mod metadata;
pub mod store;

pub use config::CacheConfig;
pub use error::{Result, StoreError};
pub use hash::{hash_bytes, hash_content};
pub use memory::MemoryCache;
pub use metadata::{FileMetadata, FileMetadataStore};
pub use store::{ChunkStore, METADATA_FILE_NAME};
