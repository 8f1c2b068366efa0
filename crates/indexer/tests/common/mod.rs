#![allow(dead_code)]

use async_trait::async_trait;
use codechunk_code_chunker::{ChunkParser, ChunkerError, CodeChunk, Language, ParserRegistry};
use codechunk_indexer::{CacheConfig, ProjectAnalyzer};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Line-based stand-in for sourcekitten.
///
/// `func name(...) {` at column 0 opens a function that ends at the next
/// line consisting of `}`. Lines `class Name {` open a class whose functions
/// (indented `func`) become its children.
pub struct LineParser {
    pub calls: AtomicUsize,
    pub delay: Duration,
}

impl LineParser {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        })
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
        })
    }

    pub fn parse_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn header(line: &str, keyword: &str) -> Option<String> {
    let rest = line.trim_start().strip_prefix(keyword)?;
    Some(format!("{keyword}{}", rest.trim_end().trim_end_matches('{').trim_end()))
}

#[async_trait]
impl ChunkParser for LineParser {
    async fn parse_file(&self, path: &Path) -> Result<Vec<CodeChunk>, ChunkerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let text = tokio::fs::read_to_string(path).await?;
        if text.contains("#error") {
            return Err(ChunkerError::parse("toy parser rejects #error"));
        }
        let file_path = path.to_string_lossy().into_owned();
        let lines: Vec<&str> = text.split('\n').collect();

        let mut top: Vec<CodeChunk> = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            if let Some(sig) = header(line, "func ") {
                let end = (i..lines.len()).find(|j| lines[*j] == "}").unwrap_or(lines.len() - 1);
                top.push(function(&sig, &lines, i, end, &file_path));
                i = end + 1;
            } else if let Some(sig) = header(line, "class ") {
                let end = (i..lines.len()).find(|j| lines[*j] == "}").unwrap_or(lines.len() - 1);
                let name = sig.trim_start_matches("class ").to_string();
                let mut class = CodeChunk::new(name, sig, "source.lang.swift.decl.class", &file_path)
                    .with_content(lines[i..=end].join("\n"))
                    .with_lines(i + 1, end + 1);
                let mut j = i + 1;
                while j < end {
                    if let Some(msig) = header(lines[j], "func ") {
                        let indent = &lines[j][..lines[j].len() - lines[j].trim_start().len()];
                        let close = format!("{indent}}}");
                        let mend = (j..end).find(|k| lines[*k] == close).unwrap_or(end - 1);
                        let mut method = function(&msig, &lines, j, mend, &file_path);
                        method.kind = "source.lang.swift.decl.function.method.instance".to_string();
                        class.children.push(method);
                        j = mend + 1;
                    } else {
                        j += 1;
                    }
                }
                top.push(class);
                i = end + 1;
            } else {
                i += 1;
            }
        }
        Ok(top)
    }
}

fn function(sig: &str, lines: &[&str], start: usize, end: usize, file_path: &str) -> CodeChunk {
    let name = sig
        .trim_start_matches("func ")
        .split('(')
        .next()
        .unwrap_or_default()
        .to_string();
    let content = lines[start..=end].join("\n");
    CodeChunk::new(
        format!("{name}()"),
        sig,
        "source.lang.swift.decl.function.free",
        file_path,
    )
    .with_calls(codechunk_code_chunker::extract_calls(&content, &name))
    .with_content(content)
    .with_lines(start + 1, end + 1)
}

pub struct Fixture {
    pub project: TempDir,
    pub cache: TempDir,
    pub parser: Arc<LineParser>,
    pub analyzer: ProjectAnalyzer,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_parser(LineParser::new(), CacheConfig::default())
    }

    pub fn with_parser(parser: Arc<LineParser>, config: CacheConfig) -> Self {
        let project = TempDir::new().expect("project dir");
        let cache = TempDir::new().expect("cache dir");
        let mut registry = ParserRegistry::new();
        registry
            .register(Language::Swift, parser.clone())
            .expect("register");
        let config = CacheConfig {
            cache_dir: cache.path().join("chunks"),
            ..config
        };
        let analyzer = ProjectAnalyzer::new(config, registry);
        Self {
            project,
            cache,
            parser,
            analyzer,
        }
    }

    pub fn file(&self, rel: &str) -> PathBuf {
        self.project.path().join(rel)
    }

    pub async fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.file(rel);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.expect("mkdir");
        }
        tokio::fs::write(&path, content).await.expect("write");
        path
    }
}
