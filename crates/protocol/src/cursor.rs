use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

/// Current page token format
pub const PAGE_TOKEN_VERSION: u32 = 1;

// Decode-only caps. Chunk ids are whole signatures, so encoding is never
// size-limited.
const MAX_TOKEN_BASE64_CHARS: usize = 4 * 1024 * 1024;
const MAX_TOKEN_JSON_BYTES: usize = 3 * 1024 * 1024;

/// Position of a page inside one chunk's content.
///
/// Line indices are 0-based into the chunk content; `end_line` is exclusive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PagingInfo {
    pub v: u32,
    pub file_path: String,
    pub chunk_id: String,
    pub start_line: usize,
    pub end_line: usize,
    pub page_size: usize,
    pub total_lines: usize,
}

impl PagingInfo {
    pub fn new(
        file_path: impl Into<String>,
        chunk_id: impl Into<String>,
        start_line: usize,
        end_line: usize,
        page_size: usize,
        total_lines: usize,
    ) -> Self {
        Self {
            v: PAGE_TOKEN_VERSION,
            file_path: file_path.into(),
            chunk_id: chunk_id.into(),
            start_line,
            end_line,
            page_size,
            total_lines,
        }
    }
}

pub fn encode_page_token(info: &PagingInfo) -> Result<String> {
    let bytes = serde_json::to_vec(info).context("serialize page token")?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

pub fn decode_page_token(token: &str) -> Result<PagingInfo> {
    let token = token.trim();
    if token.is_empty() {
        anyhow::bail!("Page token must not be empty");
    }
    if token.len() > MAX_TOKEN_BASE64_CHARS {
        anyhow::bail!("Page token too long");
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(token.as_bytes())
        .context("decode page token")?;
    if bytes.len() > MAX_TOKEN_JSON_BYTES {
        anyhow::bail!("Page token payload too large ({} bytes)", bytes.len());
    }
    let info: PagingInfo = serde_json::from_slice(&bytes).context("parse page token json")?;
    if info.v != PAGE_TOKEN_VERSION {
        anyhow::bail!("Unsupported page token version {}", info.v);
    }
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn token_is_url_safe_and_decodes() {
        let info = PagingInfo::new(
            "/p/Sources/A.swift",
            "func a() -> Result<[String], Error>",
            10,
            20,
            10,
            103,
        );
        let token = encode_page_token(&info).unwrap();
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(decode_page_token(&token).unwrap(), info);
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_page_token("").is_err());
        assert!(decode_page_token("not base64 !!").is_err());
        let not_json = URL_SAFE_NO_PAD.encode(b"hello");
        assert!(decode_page_token(&not_json).is_err());
        assert!(decode_page_token(&"A".repeat(MAX_TOKEN_BASE64_CHARS + 1)).is_err());
    }

    #[test]
    fn long_signature_round_trips() {
        let params: Vec<String> = (0..200).map(|i| format!("val field{i}: String")).collect();
        let id = format!("data class Big({})", params.join(", "));
        assert!(id.len() > 4_096);

        let info = PagingInfo::new("/p/Big.kt", id, 10, 20, 10, 30);
        let token = encode_page_token(&info).unwrap();
        assert_eq!(decode_page_token(&token).unwrap(), info);
    }

    #[test]
    fn rejects_other_versions() {
        let mut info = PagingInfo::new("/p/X.kt", "x", 0, 1, 1, 2);
        info.v = PAGE_TOKEN_VERSION + 1;
        let token = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&info).unwrap());
        assert!(decode_page_token(&token).is_err());
    }
}
