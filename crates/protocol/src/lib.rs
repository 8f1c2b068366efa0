//! Wire types shared by the analyzer and its front-ends: chunk responses,
//! function summaries, and the opaque page token codec.

use codechunk_code_chunker::CodeChunk;
use serde::{Deserialize, Serialize};

pub mod cursor;
pub mod pagination;

pub use cursor::{decode_page_token, encode_page_token, PagingInfo, PAGE_TOKEN_VERSION};
pub use pagination::paginate;

/// A chunk as served to callers, possibly one page of it
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChunkResponse {
    pub chunk_id: String,
    pub name: String,
    pub signature: String,
    pub kind: String,
    pub file_path: String,
    pub start_line: usize,
    pub end_line: usize,
    #[serde(default)]
    pub calls: Vec<String>,
    pub code_content: String,
    pub is_partial: bool,
    pub total_lines: usize,
    pub current_page: usize,
    pub total_pages: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_page_token: Option<String>,
}

impl ChunkResponse {
    /// Full, unpaginated content: page 1 of 1, no tokens
    pub fn whole(chunk: &CodeChunk) -> Self {
        Self {
            chunk_id: chunk.id.clone(),
            name: chunk.name.clone(),
            signature: chunk.signature.clone(),
            kind: chunk.kind.clone(),
            file_path: chunk.file_path.clone(),
            start_line: chunk.start_line,
            end_line: chunk.end_line,
            calls: chunk.calls.clone(),
            code_content: chunk.content.clone(),
            is_partial: false,
            total_lines: chunk.content.split('\n').count(),
            current_page: 1,
            total_pages: 1,
            next_page_token: None,
            prev_page_token: None,
        }
    }
}

/// Lightweight listing entry for a function-like chunk
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSummary {
    pub id: String,
    pub name: String,
    pub signature: String,
    pub kind: String,
    pub start_line: usize,
    pub end_line: usize,
}

impl From<&CodeChunk> for FunctionSummary {
    fn from(chunk: &CodeChunk) -> Self {
        Self {
            id: chunk.id.clone(),
            name: chunk.name.clone(),
            signature: chunk.signature.clone(),
            kind: chunk.kind.clone(),
            start_line: chunk.start_line,
            end_line: chunk.end_line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_response_omits_tokens() {
        let chunk = CodeChunk::new("a()", "func a()", "source.lang.swift.decl.function.free", "A.swift")
            .with_content("func a() {\n}");
        let value = serde_json::to_value(ChunkResponse::whole(&chunk)).unwrap();
        assert_eq!(value["chunkId"], "func a()");
        assert_eq!(value["codeContent"], "func a() {\n}");
        assert_eq!(value["totalLines"], 2);
        assert!(value.get("nextPageToken").is_none());
        assert!(value.get("prevPageToken").is_none());
    }
}
