use serde::{Deserialize, Serialize};

/// A syntactic unit extracted from one source file.
///
/// `id` is derived from the declaration's signature text, so re-parsing an
/// unchanged declaration yields the same id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeChunk {
    /// Stable, caller-visible identifier
    pub id: String,

    /// Declared name (`hello`, `UserRepository`)
    pub name: String,

    /// Full signature text (`func hello() -> String`)
    pub signature: String,

    /// Language-specific kind tag (`source.lang.swift.decl.function.free`)
    pub kind: String,

    /// Source text, newlines normalized to `\n`
    pub content: String,

    /// Owning source file
    pub file_path: String,

    /// Start line (1-indexed)
    pub start_line: usize,

    /// End line (1-indexed, inclusive)
    pub end_line: usize,

    /// Byte offset of the declaration in the file
    #[serde(default)]
    pub byte_offset: usize,

    /// Byte length of the declaration
    #[serde(default)]
    pub byte_length: usize,

    /// Names called from within this chunk
    #[serde(default)]
    pub calls: Vec<String>,

    /// Nested declarations
    #[serde(default)]
    pub children: Vec<CodeChunk>,
}

impl CodeChunk {
    /// Create a chunk with an id equal to its signature
    pub fn new(
        name: impl Into<String>,
        signature: impl Into<String>,
        kind: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        let signature = signature.into();
        Self {
            id: signature.clone(),
            name: name.into(),
            signature,
            kind: kind.into(),
            content: String::new(),
            file_path: file_path.into(),
            start_line: 1,
            end_line: 1,
            byte_offset: 0,
            byte_length: 0,
            calls: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: set content
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Builder: set line span
    #[must_use]
    pub const fn with_lines(mut self, start_line: usize, end_line: usize) -> Self {
        self.start_line = start_line;
        self.end_line = end_line;
        self
    }

    /// Builder: set byte span
    #[must_use]
    pub const fn with_bytes(mut self, offset: usize, length: usize) -> Self {
        self.byte_offset = offset;
        self.byte_length = length;
        self
    }

    /// Builder: set called names
    #[must_use]
    pub fn with_calls(mut self, calls: Vec<String>) -> Self {
        self.calls = calls;
        self
    }

    /// Builder: add nested chunk
    #[must_use]
    pub fn add_child(mut self, child: CodeChunk) -> Self {
        self.children.push(child);
        self
    }

    /// Get the number of lines in this chunk
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    /// Function-like kinds (functions, methods, initializers)
    #[must_use]
    pub fn is_callable(&self) -> bool {
        self.kind.contains("function")
    }
}

/// Flatten a chunk tree into parent-first order.
///
/// Every node appears exactly once, still carrying its own `children`, so a
/// stored parent keeps its nesting while each child is stored on its own.
#[must_use]
pub fn flatten_chunks(chunks: &[CodeChunk]) -> Vec<CodeChunk> {
    let mut out = Vec::new();
    for chunk in chunks {
        out.push(chunk.clone());
        out.extend(flatten_chunks(&chunk.children));
    }
    out
}
