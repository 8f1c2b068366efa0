//! # Codechunk Code Chunker
//!
//! Turns Swift and Kotlin source files into trees of named code chunks by
//! driving external structure parsers.
//!
//! ## Architecture
//!
//! ```text
//! Source file
//!     │
//!     ├──> Language Detection (from extension)
//!     │
//!     ├──> ParserRegistry ──> ChunkParser
//!     │                        ├─> SwiftParser  (sourcekitten structure --file)
//!     │                        └─> KotlinParser (java -jar kotlin-parser-cli.jar)
//!     │                              │
//!     │                              └─> CommandRunner (timeout, stderr capture)
//!     │
//!     └──> CodeChunk tree
//!          ├─> id = signature text
//!          ├─> content sliced by byte offset, newline-normalized
//!          └─> calls = `name(` references inside functions
//! ```
//!
//! `flatten_chunks` turns the tree into the flat list the cache stores.
//!
//! ## Example
//!
//! ```rust,no_run
//! use codechunk_code_chunker::{ParserConfig, ParserRegistry};
//! use std::path::Path;
//!
//! # async fn run() -> codechunk_code_chunker::Result<()> {
//! let registry = ParserRegistry::with_defaults(&ParserConfig::from_env());
//! let parser = registry.parser_for_path(Path::new("Sources/App/main.swift"))?;
//! let chunks = parser.parse_file(Path::new("Sources/App/main.swift")).await?;
//! for chunk in codechunk_code_chunker::flatten_chunks(&chunks) {
//!     println!("{} at lines {}-{}", chunk.id, chunk.start_line, chunk.end_line);
//! }
//! # Ok(())
//! # }
//! ```

mod command;
mod config;
mod error;
mod kotlin;
mod language;
mod parser;
mod swift;
mod text;
mod types;

pub use command::{CommandOutput, CommandRunner, ProcessRunner};
pub use config::ParserConfig;
pub use error::{ChunkerError, Result};
pub use kotlin::KotlinParser;
pub use language::Language;
pub use parser::{ChunkParser, ParserRegistry};
pub use swift::SwiftParser;
pub use text::{extract_calls, line_at_byte_offset, normalize_newlines};
pub use types::{flatten_chunks, CodeChunk};
