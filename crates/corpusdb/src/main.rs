//! # corpusdb CLI
//!
//! Command-line interface for corpusdb: semantic search over document
//! collections.
//!
//! Files are chunked with a recursive token-aware splitter, embedded, and
//! searched by cosine similarity. Sessions are ephemeral: each invocation
//! builds an in-memory collection, runs, and exits.
//!
//! ## Commands
//!
//! - `corpusdb chunk <FILE>` - Split a file and print its chunks
//! - `corpusdb search <QUERY> <FILES>...` - Ingest files and run a similarity search
//! - `corpusdb config show|init|path` - Manage configuration
//!
//! ## Examples
//!
//! ```bash
//! # Inspect how a document chunks under a 200-token budget
//! corpusdb chunk notes.md --max-tokens 200 --overlap 50
//!
//! # Search a set of documents
//! corpusdb search "error handling strategy" docs/*.md
//!
//! # Get JSON output
//! corpusdb search "retry backoff" docs/*.md --format json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use corpusdb_chunker::{BpeTokenCounter, RecursiveSplitter};
use corpusdb_core::{ChunkParams, EmbeddingProvider, RecordStore, TextSplitter, TokenCounter};
use corpusdb_embed::{EmbedderPool, HashEmbedder, OpenAiEmbedder};
use corpusdb_ingest::IngestService;
use corpusdb_store::MemoryStore;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "corpusdb")]
#[command(about = "Semantic search over document collections")]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.config/corpusdb/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a file into chunks and print them
    Chunk {
        /// File to split
        file: PathBuf,

        /// Maximum tokens per chunk
        #[arg(long)]
        max_tokens: Option<usize>,

        /// Overlap tokens between consecutive chunks
        #[arg(long)]
        overlap: Option<usize>,
    },

    /// Ingest files into an in-memory collection and search them
    Search {
        /// Query string
        query: String,

        /// Files to ingest
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Maximum results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Minimum similarity score
        #[arg(long)]
        threshold: Option<f32>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print sample configuration file
    Init,
    /// Show config file path
    Path,
}

/// Output structure for the chunk command.
#[derive(Serialize)]
struct ChunkOutput {
    file: String,
    chunk_count: usize,
    chunks: Vec<ChunkItem>,
}

#[derive(Serialize)]
struct ChunkItem {
    index: usize,
    tokens: usize,
    content: String,
}

/// Output structure for search results.
#[derive(Serialize)]
struct QueryOutput {
    query: String,
    results: Vec<ResultItem>,
}

#[derive(Serialize)]
struct ResultItem {
    file: String,
    chunk_index: u32,
    score: f32,
    content: String,
}

/// Build the configured embedding provider.
fn build_provider(config: &Config) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.embedding.provider.as_str() {
        "hash" => Ok(Arc::new(HashEmbedder::with_dimension(
            config.embedding.dimension,
        ))),
        "openai" => {
            let api_key = std::env::var("OPENAI_API_KEY")
                .map_err(|_| corpusdb_core::EmbedError::MissingApiKey)?;
            Ok(Arc::new(
                OpenAiEmbedder::new(
                    api_key,
                    config.embedding.model.clone(),
                    config.embedding.dimension,
                )
                .with_base_url(config.embedding.base_url.clone()),
            ))
        }
        other => anyhow::bail!("unknown embedding provider '{other}' (expected 'hash' or 'openai')"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if let Some(ref path) = cli.config {
        Config::load_from(Some(path.clone()))
            .with_context(|| format!("Failed to load config from {}", path.display()))?
    } else {
        Config::load().context("Failed to load config")?
    };

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        config.logging.level.parse().unwrap_or(Level::INFO)
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Chunk {
            file,
            max_tokens,
            overlap,
        } => {
            let params = ChunkParams::new(
                max_tokens.unwrap_or(config.chunking.max_tokens),
                overlap.unwrap_or(config.chunking.overlap_tokens),
            );

            let counter = BpeTokenCounter::shared();
            let splitter = RecursiveSplitter::new(counter.clone());

            let text = corpusdb_ingest::extract::read_text(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let chunks = splitter.split(&text, &params)?;

            match cli.format {
                OutputFormat::Json => {
                    let output = ChunkOutput {
                        file: file.to_string_lossy().to_string(),
                        chunk_count: chunks.len(),
                        chunks: chunks
                            .iter()
                            .enumerate()
                            .map(|(index, content)| ChunkItem {
                                index,
                                tokens: counter.count(content),
                                content: content.clone(),
                            })
                            .collect(),
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Text => {
                    if chunks.is_empty() {
                        println!("No chunks (file is empty or whitespace-only).");
                    }
                    for (index, chunk) in chunks.iter().enumerate() {
                        println!("--- chunk {index} ({} tokens)", counter.count(chunk));
                        println!("{chunk}");
                        println!();
                    }
                    println!(
                        "{} chunks (max_tokens={}, overlap_tokens={})",
                        chunks.len(),
                        params.max_tokens,
                        params.overlap_tokens
                    );
                }
            }
        }

        Commands::Search {
            query,
            files,
            limit,
            threshold,
        } => {
            let limit = limit
                .unwrap_or(config.query.default_limit)
                .min(config.query.max_limit);

            let provider = build_provider(&config)?;
            let store: Arc<dyn RecordStore> =
                Arc::new(MemoryStore::new(config.embedding.dimension));
            let splitter: Arc<dyn TextSplitter> =
                Arc::new(RecursiveSplitter::new(BpeTokenCounter::shared()));
            let pool = Arc::new(EmbedderPool::new(
                provider,
                config.embedding.max_concurrent,
            ));

            let params = ChunkParams::new(
                config.chunking.max_tokens,
                config.chunking.overlap_tokens,
            );
            let service = IngestService::new(
                Arc::clone(&store),
                splitter,
                pool,
                params,
                config.embedding.batch_size,
            );

            let collection = store
                .create_collection("session", HashMap::new())
                .await
                .context("Failed to create collection")?;

            for file in &files {
                match service.ingest_file(collection.id, file).await {
                    Ok((record, chunk_count)) => {
                        info!("Ingested {:?} ({} chunks)", record.filename, chunk_count);
                    }
                    Err(e) => {
                        warn!("Skipping {}: {}", file.display(), e);
                    }
                }
            }

            let results = service
                .search(collection.id, &query, limit, threshold)
                .await
                .context("Search failed")?;

            match cli.format {
                OutputFormat::Json => {
                    let output = QueryOutput {
                        query: query.clone(),
                        results: results
                            .iter()
                            .map(|r| ResultItem {
                                file: r.filename.clone(),
                                chunk_index: r.chunk_index,
                                score: r.score,
                                content: truncate(&r.content, 200),
                            })
                            .collect(),
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Text => {
                    println!("Query: {query}\n");
                    if results.is_empty() {
                        println!("No results found.");
                    } else {
                        for (i, result) in results.iter().enumerate() {
                            println!(
                                "{}. {} #{} (score: {:.3})",
                                i + 1,
                                result.filename,
                                result.chunk_index,
                                result.score
                            );
                            println!("   {}", truncate(&result.content, 100));
                            println!();
                        }
                    }
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&config)
                            .context("Failed to serialize config")?
                    );
                }
                OutputFormat::Text => {
                    println!(
                        "{}",
                        toml::to_string_pretty(&config).context("Failed to serialize config")?
                    );
                }
            },
            ConfigAction::Init => {
                println!("{}", Config::sample_toml());
            }
            ConfigAction::Path => {
                if let Some(path) = Config::config_path() {
                    println!("{}", path.display());
                } else {
                    println!("Could not determine config directory");
                }
            }
        },
    }

    Ok(())
}

/// Truncate a string to max length, adding ellipsis if needed.
fn truncate(s: &str, max_len: usize) -> String {
    let s = s.replace('\n', " ").replace('\r', "");
    if s.chars().count() <= max_len {
        s
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
