use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 60;

/// Settings for the external parser processes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// `sourcekitten` executable
    pub sourcekitten_bin: String,

    /// `java` executable used to run the Kotlin parser jar
    pub java_bin: String,

    /// Path to `kotlin-parser-cli.jar`
    pub kotlin_parser_jar: PathBuf,

    /// Upper bound for a single parser invocation
    pub command_timeout: Duration,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            sourcekitten_bin: "sourcekitten".to_string(),
            java_bin: "java".to_string(),
            kotlin_parser_jar: PathBuf::from("kotlin-parser-cli/build/libs/kotlin-parser-cli.jar"),
            command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
        }
    }
}

impl ParserConfig {
    /// Defaults overridden by `CODECHUNK_SOURCEKITTEN`, `CODECHUNK_JAVA`,
    /// `CODECHUNK_KOTLIN_PARSER_JAR` and `CODECHUNK_PARSER_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(bin) = non_empty_env("CODECHUNK_SOURCEKITTEN") {
            config.sourcekitten_bin = bin;
        }
        if let Some(bin) = non_empty_env("CODECHUNK_JAVA") {
            config.java_bin = bin;
        }
        if let Some(jar) = non_empty_env("CODECHUNK_KOTLIN_PARSER_JAR") {
            config.kotlin_parser_jar = PathBuf::from(jar);
        }
        if let Some(secs) = non_empty_env("CODECHUNK_PARSER_TIMEOUT_SECS")
            .and_then(|raw| raw.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
        {
            config.command_timeout = Duration::from_secs(secs);
        }
        config
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
