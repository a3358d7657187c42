use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use search_core::corpus::load_pages;
use search_core::index::ReverseIndex;
use search_core::{EngineConfig, RankingPolicy, SearchEngine};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build TF-IDF and PageRank over a crawl and query it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CorpusArgs {
    /// Crawled pages: a .json/.jsonl file or a directory of them
    #[arg(long)]
    pages: String,
    /// Optional engine config (JSON)
    #[arg(long)]
    config: Option<String>,
    /// Disable stemming regardless of the config file
    #[arg(long, default_value_t = false)]
    no_stem: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the engine and print corpus statistics
    Stats {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
    /// Rank pages for a query
    Search {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// tfidf, cosine or combined
        #[arg(long, default_value = "tfidf")]
        mode: RankingPolicy,
        /// Maximum number of results to print
        #[arg(long, default_value_t = 10)]
        k: usize,
        /// Query words
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Print the PageRank table, highest first
    Pagerank {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
    /// Write the reverse index and PageRank table as JSON
    Export {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Output file; stdout when omitted
        #[arg(long)]
        output: Option<String>,
    },
}

#[derive(Serialize)]
struct IndexExport<'a> {
    created_at: String,
    num_pages: usize,
    vocabulary_size: usize,
    page_rank_iterations: usize,
    page_rank_converged: bool,
    reverse_index: &'a ReverseIndex,
    page_rank: &'a BTreeMap<String, f64>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats { corpus } => stats(&build_engine(&corpus)?),
        Commands::Search { corpus, mode, k, query } => search(&build_engine(&corpus)?, mode, k, &query),
        Commands::Pagerank { corpus } => print_page_rank(&build_engine(&corpus)?),
        Commands::Export { corpus, output } => export(&build_engine(&corpus)?, output.as_deref()),
    }
}

// Config first, then the crawl, then the engine.
fn build_engine(args: &CorpusArgs) -> Result<SearchEngine> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if args.no_stem {
        config.stemming = false;
    }
    let pages = load_pages(&args.pages)?;
    let engine = SearchEngine::from_config(pages, &config)
        .with_context(|| format!("building search engine from {}", args.pages))?;
    Ok(engine)
}

fn stats(engine: &SearchEngine) -> Result<()> {
    let index = engine.index();
    let solver = engine.page_rank_solver();
    let links: usize = engine.pages().map(|p| p.links().len()).sum();
    let tokens: usize = index.forward_index().values().map(Vec::len).sum();
    println!("pages:        {}", index.total_pages());
    println!("links:        {links}");
    println!("tokens:       {tokens}");
    println!("vocabulary:   {}", index.vocabulary().len());
    println!("pagerank:     {} iterations, delta {:.6}, converged {}", solver.iterations(), solver.delta(), solver.converged());
    println!("pagerank sum: {:.5}", engine.page_ranks().values().sum::<f64>());
    Ok(())
}

fn search(engine: &SearchEngine, mode: RankingPolicy, k: usize, query: &[String]) -> Result<()> {
    let hits = engine.rank(mode, query)?;
    tracing::info!(%mode, results = hits.len(), "search finished");
    if hits.is_empty() {
        println!("No results found for: {}", query.join(" "));
        return Ok(());
    }
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for hit in hits.iter().take(k) {
        let title = engine.page(&hit.url).map(|p| p.title()).unwrap_or_default();
        writeln!(out, "-> {} [{:.5}]", hit.url, hit.score)?;
        writeln!(out, "   Title: {title}")?;
        let snippet = engine.snippet(&hit.url, query);
        if !snippet.is_empty() {
            writeln!(out, "   {snippet}")?;
        }
    }
    Ok(())
}

fn print_page_rank(engine: &SearchEngine) -> Result<()> {
    let mut ranks: Vec<(&String, &f64)> = engine.page_ranks().iter().collect();
    ranks.sort_by(|a, b| b.1.total_cmp(a.1));
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (url, rank) in ranks {
        writeln!(out, "{rank:.5}  {url}")?;
    }
    Ok(())
}

fn export(engine: &SearchEngine, output: Option<&str>) -> Result<()> {
    let solver = engine.page_rank_solver();
    let doc = IndexExport {
        created_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_default(),
        num_pages: engine.index().total_pages(),
        vocabulary_size: engine.index().vocabulary().len(),
        page_rank_iterations: solver.iterations(),
        page_rank_converged: solver.converged(),
        reverse_index: engine.index().reverse_index(),
        page_rank: engine.page_ranks(),
    };
    match output {
        Some(path) => {
            let f = File::create(path).with_context(|| format!("creating {path}"))?;
            let mut w = BufWriter::new(f);
            serde_json::to_writer_pretty(&mut w, &doc)?;
            w.flush()?;
            tracing::info!(output = path, "index export complete");
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            serde_json::to_writer_pretty(&mut out, &doc)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
