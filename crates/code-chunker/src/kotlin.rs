//! Kotlin adapter over the `kotlin-parser-cli` jar.
//!
//! The jar prints one JSON tree per file:
//!
//! ```text
//! { type, name, signature, content, startLine, endLine, offset, length, children: [...] }
//! ```
//!
//! The root node is the file itself; its children are the top-level
//! declarations.

use crate::command::CommandRunner;
use crate::error::{ChunkerError, Result};
use crate::language::Language;
use crate::parser::ChunkParser;
use crate::text::{byte_slice, extract_calls, line_at_byte_offset, normalize_newlines};
use crate::types::CodeChunk;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct KotlinAstNode {
    #[serde(rename = "type")]
    node_type: String,
    name: String,
    signature: String,
    content: String,
    start_line: usize,
    end_line: usize,
    offset: usize,
    length: usize,
    children: Vec<KotlinAstNode>,
}

/// Parser for `.kt` / `.kts` files
pub struct KotlinParser {
    java: String,
    jar: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl KotlinParser {
    pub fn new(java: impl Into<String>, jar: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            java: java.into(),
            jar: jar.into(),
            runner,
        }
    }
}

#[async_trait]
impl ChunkParser for KotlinParser {
    async fn parse_file(&self, path: &Path) -> Result<Vec<CodeChunk>> {
        let args = vec![
            "-jar".to_string(),
            self.jar.to_string_lossy().into_owned(),
            path.to_string_lossy().into_owned(),
        ];
        let output = self.runner.run(&self.java, &args).await?;
        if output.stdout.trim().is_empty() {
            return Err(ChunkerError::parse(format!(
                "kotlin-parser-cli printed nothing for {}",
                path.display()
            )));
        }
        let root: KotlinAstNode = serde_json::from_str(&output.stdout)?;
        let source = tokio::fs::read(path).await?;

        let file_path = path.to_string_lossy();
        let chunks: Vec<CodeChunk> = root
            .children
            .iter()
            .map(|node| to_chunk(node, &source, &file_path))
            .collect();
        log::debug!("Parsed {} top-level Kotlin declarations from {}", chunks.len(), file_path);
        Ok(chunks)
    }
}

fn to_chunk(node: &KotlinAstNode, source: &[u8], file_path: &str) -> CodeChunk {
    let signature = if node.signature.is_empty() {
        node.name.clone()
    } else {
        node.signature.clone()
    };
    let kind = format!("{}{}", Language::Kotlin.kind_prefix(), node.node_type);

    // Parser-provided text wins; otherwise cut the declaration out of the file.
    let raw = if node.content.is_empty() {
        byte_slice(source, node.offset, node.length)
    } else {
        node.content.clone()
    };
    let content = normalize_newlines(&raw);

    let start_line = if node.start_line > 0 {
        node.start_line
    } else {
        line_at_byte_offset(source, node.offset)
    };
    let end_line = if node.end_line > 0 {
        node.end_line
    } else {
        line_at_byte_offset(source, node.offset + node.length)
    }
    .max(start_line);

    let calls = if node.node_type == "function" {
        extract_calls(&content, &node.name)
    } else {
        Vec::new()
    };

    let mut chunk = CodeChunk::new(node.name.clone(), signature, kind, file_path)
        .with_content(content)
        .with_lines(start_line, end_line)
        .with_bytes(node.offset, node.length)
        .with_calls(calls);
    chunk.children = node
        .children
        .iter()
        .map(|child| to_chunk(child, source, file_path))
        .collect();
    chunk
}
