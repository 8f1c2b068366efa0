//! # Codechunk Indexer
//!
//! Project analysis and lazily consistent chunk queries.
//!
//! ## Pipeline
//!
//! ```text
//! analyze_project(root)
//!     │
//!     ├──> wipe cache (memory + disk + metadata.json)
//!     ├──> File Scanner (.gitignore aware, registered extensions only)
//!     └──> per file: ChunkParser → flatten → metadata.update → MemoryCache.set
//!
//! get_chunk / list_functions_in_file / find_functions / get_function_chunk
//!     │
//!     ├──> ensure_latest(file)      single-flight per path
//!     │      ├─> missing  → clear_for_file
//!     │      └─> changed  → clear_for_file + re-parse that file only
//!     └──> serve from MemoryCache, paginated when large
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use codechunk_code_chunker::{ParserConfig, ParserRegistry};
//! use codechunk_indexer::{CacheConfig, ProjectAnalyzer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = ParserRegistry::with_defaults(&ParserConfig::from_env());
//!     let analyzer = ProjectAnalyzer::new(CacheConfig::from_env(), registry);
//!     let report = analyzer.analyze_project("/path/to/project").await?;
//!     println!("Analyzed {} files, {} chunks", report.files, report.chunks);
//!
//!     if let Some(chunk) = analyzer.get_chunk("func hello()", None, None).await {
//!         println!("{}", chunk.code_content);
//!     }
//!     Ok(())
//! }
//! ```

mod analyzer;
mod error;
mod report;
mod scanner;

pub use analyzer::ProjectAnalyzer;
pub use codechunk_store::CacheConfig;
pub use error::{IndexerError, Result};
pub use report::AnalysisReport;
pub use scanner::FileScanner;
