//! Swift adapter over `sourcekitten structure --file <path>`.

use crate::command::CommandRunner;
use crate::error::{ChunkerError, Result};
use crate::language::Language;
use crate::parser::ChunkParser;
use crate::text::{byte_slice, extract_calls, line_at_byte_offset, normalize_newlines};
use crate::types::CodeChunk;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// One node of the sourcekitten structure tree
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SourceKittenNode {
    #[serde(rename = "key.kind", default)]
    kind: Option<String>,
    #[serde(rename = "key.name", default)]
    name: Option<String>,
    #[serde(rename = "key.typename", default)]
    typename: Option<String>,
    #[serde(rename = "key.offset", default)]
    offset: usize,
    #[serde(rename = "key.length", default)]
    length: usize,
    #[serde(rename = "key.substructure", default)]
    substructure: Vec<SourceKittenNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclKind {
    Function,
    Type(&'static str),
}

fn classify(kind: &str) -> Option<DeclKind> {
    let rest = kind.strip_prefix(Language::Swift.kind_prefix())?;
    let head = rest.split('.').next().unwrap_or_default();
    match head {
        "function" => Some(DeclKind::Function),
        "class" => Some(DeclKind::Type("class")),
        "struct" => Some(DeclKind::Type("struct")),
        "enum" => Some(DeclKind::Type("enum")),
        "protocol" => Some(DeclKind::Type("protocol")),
        "extension" => Some(DeclKind::Type("extension")),
        _ => None,
    }
}

/// Parser for `.swift` files
pub struct SwiftParser {
    program: String,
    runner: Arc<dyn CommandRunner>,
}

impl SwiftParser {
    pub fn new(program: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }
}

#[async_trait]
impl ChunkParser for SwiftParser {
    async fn parse_file(&self, path: &Path) -> Result<Vec<CodeChunk>> {
        let args = vec![
            "structure".to_string(),
            "--file".to_string(),
            path.to_string_lossy().into_owned(),
        ];
        let output = self.runner.run(&self.program, &args).await?;
        if output.stdout.trim().is_empty() {
            return Err(ChunkerError::parse(format!(
                "sourcekitten printed nothing for {}",
                path.display()
            )));
        }
        let root: SourceKittenNode = serde_json::from_str(&output.stdout)?;
        let source = tokio::fs::read(path).await?;

        let file_path = path.to_string_lossy();
        let chunks = collect_declarations(&root.substructure, &source, &file_path);
        log::debug!("Parsed {} top-level Swift declarations from {}", chunks.len(), file_path);
        Ok(chunks)
    }
}

/// Declarations under `nodes`; those found inside non-declaration nodes are
/// lifted to the nearest declaration level.
pub(crate) fn collect_declarations(
    nodes: &[SourceKittenNode],
    source: &[u8],
    file_path: &str,
) -> Vec<CodeChunk> {
    let mut out = Vec::new();
    for node in nodes {
        match node.kind.as_deref().and_then(classify) {
            Some(decl) => {
                if let Some(chunk) = to_chunk(node, decl, source, file_path) {
                    out.push(chunk);
                }
            }
            None => out.extend(collect_declarations(&node.substructure, source, file_path)),
        }
    }
    out
}

fn to_chunk(
    node: &SourceKittenNode,
    decl: DeclKind,
    source: &[u8],
    file_path: &str,
) -> Option<CodeChunk> {
    let name = node.name.clone().filter(|n| !n.is_empty())?;
    let kind = node.kind.clone().unwrap_or_default();

    let signature = match decl {
        DeclKind::Function => match node.typename.as_deref() {
            Some(ret) if !ret.is_empty() => format!("func {name} -> {ret}"),
            _ => format!("func {name}"),
        },
        DeclKind::Type(keyword) => format!("{keyword} {name}"),
    };

    let content = normalize_newlines(&byte_slice(source, node.offset, node.length));
    let start_line = line_at_byte_offset(source, node.offset);
    let end_line = line_at_byte_offset(source, node.offset + node.length).max(start_line);

    let calls = if decl == DeclKind::Function {
        let bare = name.split('(').next().unwrap_or(&name);
        extract_calls(&content, bare)
    } else {
        Vec::new()
    };

    let mut chunk = CodeChunk::new(name, signature, kind, file_path)
        .with_content(content)
        .with_lines(start_line, end_line)
        .with_bytes(node.offset, node.length)
        .with_calls(calls);
    chunk.children = collect_declarations(&node.substructure, source, file_path);
    Some(chunk)
}
