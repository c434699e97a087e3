use algoseek_core::corpus::load_corpus;
use algoseek_core::{build_index, search, CorpusIndex, SearchConfig};
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build the problem index from a corpus and inspect or query it", long_about = None)]
struct Cli {
    /// Optional JSON file overriding ranking parameters
    #[arg(long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print document count, vocabulary size and average document length
    Stats {
        /// Corpus path (JSON/JSONL file or directory)
        #[arg(long)]
        corpus: String,
    },
    /// Rank the corpus against a query and print the top results
    Query {
        /// Corpus path (JSON/JSONL file or directory)
        #[arg(long)]
        corpus: String,
        /// Free-text query
        #[arg(long)]
        q: String,
        /// Number of results
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Serialize)]
struct QueryHit<'a> {
    rank: usize,
    doc_id: u32,
    title: &'a str,
    url: &'a str,
    bm25_score: f32,
    title_boost: f32,
    final_score: f32,
}

#[derive(Serialize)]
struct QueryReport<'a> {
    query: &'a str,
    processed_query: String,
    total_hits: usize,
    results: Vec<QueryHit<'a>>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => SearchConfig::load(path)?,
        None => SearchConfig::default(),
    };

    match cli.command {
        Commands::Stats { corpus } => {
            let index = load_index(&corpus, &config)?;
            println!("{}", serde_json::to_string_pretty(&index.stats())?);
        }
        Commands::Query { corpus, q, limit } => {
            let index = load_index(&corpus, &config)?;
            let limit = limit.unwrap_or(config.default_limit);
            tracing::debug!(query = %q, limit, "running query");
            println!("{}", serde_json::to_string_pretty(&query_report(&index, &q, limit))?);
        }
    }
    Ok(())
}

fn load_index(corpus: &str, config: &SearchConfig) -> Result<CorpusIndex> {
    let documents = load_corpus(corpus)?;
    if documents.is_empty() {
        tracing::warn!(corpus, "corpus is empty, every query will return no results");
    }
    Ok(build_index(documents, config))
}

fn query_report<'a>(index: &'a CorpusIndex, q: &'a str, limit: usize) -> QueryReport<'a> {
    let outcome = search(q, index, limit);
    let results = outcome
        .results
        .iter()
        .enumerate()
        .filter_map(|(i, r)| {
            let doc = index.document(r.doc_id)?;
            Some(QueryHit {
                rank: i + 1,
                doc_id: r.doc_id,
                title: &doc.title,
                url: &doc.url,
                bm25_score: r.bm25_score,
                title_boost: r.title_boost,
                final_score: r.final_score,
            })
        })
        .collect();
    QueryReport { query: q, processed_query: outcome.processed_query.join(" "), total_hits: outcome.total_hits, results }
}
