use thiserror::Error;

/// Result type for chunker operations
pub type Result<T> = std::result::Result<T, ChunkerError>;

/// Errors that can occur while turning a source file into chunks
#[derive(Error, Debug)]
pub enum ChunkerError {
    /// Parser output could not be interpreted
    #[error("Parse error: {0}")]
    ParseError(String),

    /// No parser handles this language / extension
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// A parser for the language is already registered
    #[error("Parser for language '{0}' already registered")]
    AlreadyRegistered(String),

    /// External parser exited unsuccessfully
    #[error("Command `{command}` failed with code {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// External parser did not finish in time
    #[error("Command `{command}` timed out after {timeout_ms}ms")]
    CommandTimeout { command: String, timeout_ms: u64 },

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Parser emitted invalid JSON
    #[error("Invalid parser output: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ChunkerError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an unsupported language error
    pub fn unsupported_language(lang: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(lang.into())
    }
}
