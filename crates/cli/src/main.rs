use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use codechunk_code_chunker::{ParserConfig, ParserRegistry};
use codechunk_indexer::{CacheConfig, ProjectAnalyzer};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "codechunk")]
#[command(about = "Cached, lazily refreshed code chunks for AI agents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Chunk cache directory (overrides CODECHUNK_CACHE_DIR)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Chunks kept in memory (overrides CODECHUNK_MEMORY_CAPACITY)
    #[arg(long, global = true)]
    memory_capacity: Option<usize>,

    /// sourcekitten executable (overrides CODECHUNK_SOURCEKITTEN)
    #[arg(long, global = true)]
    sourcekitten: Option<String>,

    /// kotlin-parser-cli jar (overrides CODECHUNK_KOTLIN_PARSER_JAR)
    #[arg(long, global = true)]
    kotlin_parser_jar: Option<PathBuf>,

    /// Per-file parser timeout in seconds (overrides CODECHUNK_PARSER_TIMEOUT_SECS)
    #[arg(long, global = true)]
    parser_timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Wipe the cache and parse every Swift/Kotlin file under a directory
    Analyze(AnalyzeArgs),

    /// Fetch one chunk by id, re-parsing its file first if it changed
    #[command(name = "get-chunk")]
    GetChunk(GetChunkArgs),

    /// List functions of a file, ordered by line
    #[command(name = "list-functions")]
    ListFunctions(FileArgs),

    /// List functions of a file whose signature contains a query
    #[command(name = "find-functions")]
    FindFunctions(FindFunctionsArgs),

    /// Fetch the chunk of a file with an exact signature
    #[command(name = "get-function-chunk")]
    GetFunctionChunk(GetFunctionChunkArgs),

    /// List every cached chunk id
    #[command(name = "list-chunks")]
    ListChunks,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Project root
    #[arg(default_value = ".")]
    path: PathBuf,
}

#[derive(Args)]
struct PageArgs {
    /// Lines per page (defaults to CODECHUNK_PAGE_SIZE or 100)
    #[arg(long)]
    page_size: Option<usize>,

    /// Token from a previous page's nextPageToken / prevPageToken
    #[arg(long)]
    page_token: Option<String>,
}

#[derive(Args)]
struct GetChunkArgs {
    /// Chunk id (the declaration signature)
    id: String,

    #[command(flatten)]
    page: PageArgs,
}

#[derive(Args)]
struct FileArgs {
    /// Source file
    file: PathBuf,
}

#[derive(Args)]
struct FindFunctionsArgs {
    /// Source file
    file: PathBuf,

    /// Substring to look for in signatures
    query: String,
}

#[derive(Args)]
struct GetFunctionChunkArgs {
    /// Source file
    file: PathBuf,

    /// Exact function signature
    signature: String,

    #[command(flatten)]
    page: PageArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // stdout carries the JSON result
    builder.target(env_logger::Target::Stderr).init();

    let analyzer = ProjectAnalyzer::new(cache_config(&cli), parser_registry(&cli));
    log::debug!("Using {analyzer:?}");

    match cli.command {
        Commands::Analyze(args) => {
            let report = analyzer
                .analyze_project(&args.path)
                .await
                .with_context(|| format!("Failed to analyze {}", args.path.display()))?;
            print_json(&report)?;
        }
        Commands::GetChunk(args) => {
            let chunk = analyzer
                .get_chunk(&args.id, args.page.page_size, args.page.page_token.as_deref())
                .await
                .with_context(|| format!("Chunk not found: {}", args.id))?;
            print_json(&chunk)?;
        }
        Commands::ListFunctions(args) => {
            print_json(&analyzer.list_functions_in_file(&args.file).await)?;
        }
        Commands::FindFunctions(args) => {
            print_json(&analyzer.find_functions(&args.file, &args.query).await)?;
        }
        Commands::GetFunctionChunk(args) => {
            let chunk = analyzer
                .get_function_chunk(
                    &args.file,
                    &args.signature,
                    args.page.page_size,
                    args.page.page_token.as_deref(),
                )
                .await
                .with_context(|| {
                    format!(
                        "Function '{}' not found in {}",
                        args.signature,
                        args.file.display()
                    )
                })?;
            print_json(&chunk)?;
        }
        Commands::ListChunks => {
            print_json(&analyzer.list_chunk_ids().await)?;
        }
    }

    Ok(())
}

fn cache_config(cli: &Cli) -> CacheConfig {
    let mut config = CacheConfig::from_env();
    if let Some(dir) = &cli.cache_dir {
        config.cache_dir = dir.clone();
    }
    if let Some(capacity) = cli.memory_capacity {
        config = config.with_memory_capacity(capacity);
    }
    config
}

fn parser_registry(cli: &Cli) -> ParserRegistry {
    let mut config = ParserConfig::from_env();
    if let Some(bin) = &cli.sourcekitten {
        config.sourcekitten_bin = bin.clone();
    }
    if let Some(jar) = &cli.kotlin_parser_jar {
        config.kotlin_parser_jar = jar.clone();
    }
    if let Some(secs) = cli.parser_timeout_secs.filter(|s| *s > 0) {
        config.command_timeout = Duration::from_secs(secs);
    }
    ParserRegistry::with_defaults(&config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{text}");
    Ok(())
}
