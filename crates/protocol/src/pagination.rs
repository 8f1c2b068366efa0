use crate::cursor::{decode_page_token, encode_page_token, PagingInfo};
use crate::ChunkResponse;
use codechunk_code_chunker::CodeChunk;

/// Where a page token resumes, or `None` when it must be ignored.
///
/// Tokens for another chunk, of another format version, malformed, or pointing
/// past the end all fall back to the first page.
fn resume_line(token: Option<&str>, chunk: &CodeChunk, total_lines: usize) -> Option<usize> {
    let info = decode_page_token(token?).ok()?;
    if info.chunk_id != chunk.id
        || info.file_path != chunk.file_path
        || info.start_line >= total_lines
    {
        return None;
    }
    Some(info.start_line)
}

fn token(chunk: &CodeChunk, start: usize, end: usize, page_size: usize, total: usize) -> Option<String> {
    let info = PagingInfo::new(&chunk.file_path, &chunk.id, start, end, page_size, total);
    match encode_page_token(&info) {
        Ok(token) => Some(token),
        Err(err) => {
            log::error!("Failed to encode page token for '{}': {err:#}", chunk.id);
            None
        }
    }
}

/// One page of `chunk.content`.
///
/// Lines are the `\n`-separated pieces of the content; `page_size` is clamped
/// to at least 1. The reported `start_line`/`end_line` are file line numbers.
pub fn paginate(chunk: &CodeChunk, page_size: usize, token_in: Option<&str>) -> ChunkResponse {
    let page_size = page_size.max(1);
    let lines: Vec<&str> = chunk.content.split('\n').collect();
    let total_lines = lines.len();

    let start = resume_line(token_in, chunk, total_lines).unwrap_or(0);
    let end = (start + page_size).min(total_lines);

    let next_page_token = (end < total_lines).then(|| {
        token(
            chunk,
            end,
            (end + page_size).min(total_lines),
            page_size,
            total_lines,
        )
    });
    let prev_page_token = (start > 0).then(|| {
        token(
            chunk,
            start.saturating_sub(page_size),
            start,
            page_size,
            total_lines,
        )
    });

    let mut response = ChunkResponse::whole(chunk);
    response.code_content = lines[start..end].join("\n");
    response.start_line = chunk.start_line + start;
    response.end_line = chunk.start_line + end - 1;
    response.is_partial = total_lines > page_size;
    response.total_lines = total_lines;
    response.current_page = start / page_size + 1;
    response.total_pages = total_lines.div_ceil(page_size);
    response.next_page_token = next_page_token.flatten();
    response.prev_page_token = prev_page_token.flatten();
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chunk_with_lines(n: usize) -> CodeChunk {
        let body: Vec<String> = (1..=n).map(|i| format!("line {i}")).collect();
        CodeChunk::new("big()", "func big()", "source.lang.swift.decl.function.free", "Big.swift")
            .with_content(body.join("\n"))
            .with_lines(40, 40 + n - 1)
    }

    #[test]
    fn first_page_of_103_lines() {
        let chunk = chunk_with_lines(103);
        let page = paginate(&chunk, 10, None);

        assert!(page.is_partial);
        assert_eq!(page.total_lines, 103);
        assert_eq!(page.total_pages, 11);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.code_content.split('\n').count(), 10);
        assert_eq!((page.start_line, page.end_line), (40, 49));
        assert!(page.next_page_token.is_some());
        assert!(page.prev_page_token.is_none());

        let second = paginate(&chunk, 10, page.next_page_token.as_deref());
        assert_eq!(second.current_page, 2);
        assert!(second.prev_page_token.is_some());
        assert_eq!(second.code_content.lines().next(), Some("line 11"));
        assert_eq!((second.start_line, second.end_line), (50, 59));
    }

    #[test]
    fn following_tokens_reconstructs_content() {
        let chunk = chunk_with_lines(103);
        let mut pages = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = paginate(&chunk, 10, token.as_deref());
            pages.push(page.code_content.clone());
            token = page.next_page_token;
            if token.is_none() {
                assert_eq!(page.current_page, 11);
                assert_eq!(page.code_content, "line 101\nline 102\nline 103");
                break;
            }
        }
        assert_eq!(pages.join("\n"), chunk.content);
    }

    #[test]
    fn prev_token_goes_back_one_page() {
        let chunk = chunk_with_lines(25);
        let first = paginate(&chunk, 10, None);
        let second = paginate(&chunk, 10, first.next_page_token.as_deref());
        let back = paginate(&chunk, 10, second.prev_page_token.as_deref());
        assert_eq!(back.current_page, 1);
        assert_eq!(back.code_content, first.code_content);
    }

    #[test]
    fn foreign_or_bad_token_starts_over() {
        let chunk = chunk_with_lines(30);
        let other = CodeChunk::new("o()", "func o()", "source.lang.swift.decl.function.free", "O.swift")
            .with_content(chunk.content.clone());
        let foreign = paginate(&other, 10, None).next_page_token;

        let page = paginate(&chunk, 10, foreign.as_deref());
        assert_eq!(page.current_page, 1);

        let page = paginate(&chunk, 10, Some("%%%garbage"));
        assert_eq!(page.current_page, 1);

        let beyond = PagingInfo::new(&chunk.file_path, &chunk.id, 500, 510, 10, 30);
        let beyond = encode_page_token(&beyond).unwrap();
        assert_eq!(paginate(&chunk, 10, Some(&beyond)).current_page, 1);

        let mut elsewhere = chunk.clone();
        elsewhere.file_path = "Other.swift".to_string();
        let elsewhere = paginate(&elsewhere, 10, None).next_page_token;
        let page = paginate(&chunk, 10, elsewhere.as_deref());
        assert_eq!(page.current_page, 1);
    }

    #[test]
    fn very_long_signature_still_pages_through() {
        let params: Vec<String> = (0..120).map(|i| format!("val field{i}: String")).collect();
        let signature = format!("data class Big({})", params.join(", "));
        assert!(signature.len() > 2_048);
        let body: Vec<String> = (1..=30).map(|i| format!("line {i}")).collect();
        let chunk = CodeChunk::new("Big", signature, "source.lang.kotlin.decl.class", "/p/Big.kt")
            .with_content(body.join("\n"))
            .with_lines(1, 30);

        let mut pages = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = paginate(&chunk, 10, token.as_deref());
            assert_eq!(page.total_pages, 3);
            assert_eq!(page.next_page_token.is_some(), page.current_page < 3);
            pages.push(page.code_content);
            token = page.next_page_token;
            if token.is_none() {
                break;
            }
        }
        assert_eq!(pages.len(), 3);
        assert_eq!(pages.join("\n"), chunk.content);
    }

    #[test]
    fn small_chunk_is_single_page() {
        let chunk = chunk_with_lines(3);
        let page = paginate(&chunk, 0, None);
        assert_eq!(page.total_pages, 3);

        let page = paginate(&chunk, 100, None);
        assert!(!page.is_partial);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.code_content, chunk.content);
        assert!(page.next_page_token.is_none());
    }
}
