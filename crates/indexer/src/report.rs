use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of a full project sweep
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Project root that was analyzed
    pub project_path: String,

    /// Files parsed successfully
    pub files: usize,

    /// Chunks stored (flattened, children included)
    pub chunks: usize,

    /// Successfully parsed files per language
    pub languages: BTreeMap<String, usize>,

    /// One entry per file that failed to parse
    pub errors: Vec<String>,

    /// Wall time in milliseconds
    pub elapsed_ms: u64,
}

impl AnalysisReport {
    pub fn new(project_path: impl Into<String>) -> Self {
        Self {
            project_path: project_path.into(),
            ..Self::default()
        }
    }

    pub fn add_file(&mut self, language: &str, chunks: usize) {
        self.files += 1;
        self.chunks += chunks;
        *self.languages.entry(language.to_string()).or_insert(0) += 1;
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_files_per_language() {
        let mut report = AnalysisReport::new("/tmp/project");
        report.add_file("swift", 3);
        report.add_file("swift", 1);
        report.add_file("kotlin", 2);
        report.add_error("Bad.swift: parse error".to_string());

        assert_eq!(report.files, 3);
        assert_eq!(report.chunks, 6);
        assert_eq!(report.languages.get("swift"), Some(&2));
        assert_eq!(report.languages.get("kotlin"), Some(&1));

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["projectPath"], "/tmp/project");
        assert_eq!(value["elapsedMs"], 0);
        assert_eq!(value["errors"][0], "Bad.swift: parse error");
    }
}
