use crate::command::ProcessRunner;
use crate::config::ParserConfig;
use crate::error::{ChunkerError, Result};
use crate::kotlin::KotlinParser;
use crate::language::Language;
use crate::swift::SwiftParser;
use crate::types::CodeChunk;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Turns one source file into a chunk tree.
///
/// `Ok(vec![])` is a valid parse of a file with no declarations; any failure
/// is an `Err` so callers can tell the two apart.
#[async_trait]
pub trait ChunkParser: Send + Sync {
    async fn parse_file(&self, path: &Path) -> Result<Vec<CodeChunk>>;
}

/// Maps languages to their parser
#[derive(Clone, Default)]
pub struct ParserRegistry {
    parsers: HashMap<Language, Arc<dyn ChunkParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the sourcekitten and kotlin-parser-cli adapters
    pub fn with_defaults(config: &ParserConfig) -> Self {
        let runner = Arc::new(ProcessRunner::new(config.command_timeout));
        let mut parsers: HashMap<Language, Arc<dyn ChunkParser>> = HashMap::new();
        parsers.insert(
            Language::Swift,
            Arc::new(SwiftParser::new(
                config.sourcekitten_bin.clone(),
                runner.clone(),
            )),
        );
        parsers.insert(
            Language::Kotlin,
            Arc::new(KotlinParser::new(
                config.java_bin.clone(),
                config.kotlin_parser_jar.clone(),
                runner,
            )),
        );
        Self { parsers }
    }

    /// Register `parser` for `language`; a second registration for the same
    /// language is rejected.
    pub fn register(&mut self, language: Language, parser: Arc<dyn ChunkParser>) -> Result<()> {
        if language == Language::Unknown {
            return Err(ChunkerError::unsupported_language(language.as_str()));
        }
        if self.parsers.contains_key(&language) {
            return Err(ChunkerError::AlreadyRegistered(language.as_str().to_string()));
        }
        self.parsers.insert(language, parser);
        Ok(())
    }

    /// Parser responsible for `path`, selected by extension
    pub fn parser_for_path(&self, path: &Path) -> Result<Arc<dyn ChunkParser>> {
        let language = Language::from_path(path);
        self.parsers.get(&language).cloned().ok_or_else(|| {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default();
            ChunkerError::unsupported_language(format!("{} (extension '{ext}')", language.as_str()))
        })
    }

    pub fn supports(&self, path: &Path) -> bool {
        self.parsers.contains_key(&Language::from_path(path))
    }

    /// Registered languages, sorted
    pub fn languages(&self) -> Vec<Language> {
        let mut langs: Vec<Language> = self.parsers.keys().copied().collect();
        langs.sort();
        langs
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}
