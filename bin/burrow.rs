use anyhow::{Context, Result};
use burrow::query::load_result;
use burrow::segment::{IndexStats, TermDictionary};
use burrow::{
    build_from_config, open_query_engine, Corpus, FullScan, IndexConfig, IndexStore, Language,
    Pipeline, QueryConfig, ScoredDocument, ScoringMode,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "burrow")]
#[command(about = "Memory-bounded full-text search over a JSON-lines corpus", long_about = None)]
struct Args {
    /// JSON config file with index and tokenizer settings
    #[arg(long, env = "BURROW_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// JSON-lines corpus, one document per line
    #[arg(long, env = "BURROW_CORPUS", global = true)]
    corpus: Option<PathBuf>,

    /// Inverted index file
    #[arg(long, env = "BURROW_INDEX", global = true)]
    index: Option<PathBuf>,

    /// Byte budget of the in-memory index during builds
    #[arg(long, global = true)]
    memory_limit: Option<usize>,

    /// Stemmer and stopword language (english, german)
    #[arg(long, global = true)]
    language: Option<Language>,

    /// Stopword file, one word per line, replacing the built-in list
    #[arg(long, global = true)]
    stopwords: Option<PathBuf>,

    /// Log filter, e.g. `info` or `burrow=debug`
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the index from the corpus
    Build,
    /// Show statistics of an existing index
    Stats {
        /// Tokens listed at each end of the frequency table
        #[arg(long, default_value_t = IndexStats::DEFAULT_TOP)]
        top: usize,
    },
    /// Run a conjunctive query
    Query {
        text: String,
        /// boolean, tf or tf-idf
        #[arg(long, default_value = "boolean")]
        mode: ScoringMode,
        /// Order results by score instead of corpus order
        #[arg(long)]
        ranked: bool,
        /// Results to print
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Time index queries against a full corpus scan
    Compare {
        #[arg(required = true)]
        queries: Vec<String>,
    },
}

fn load_config(args: &Args) -> Result<IndexConfig> {
    let mut config = match &args.config {
        Some(path) => IndexConfig::from_json_file(path)?,
        None => IndexConfig::default(),
    };
    if let Some(corpus) = &args.corpus {
        config.corpus_path = corpus.clone();
    }
    if let Some(index) = &args.index {
        config.index_path = index.clone();
    }
    if let Some(limit) = args.memory_limit {
        config.memory_limit_bytes = limit;
    }
    if let Some(language) = args.language {
        config.tokenizer.language = language;
    }
    if let Some(stopwords) = &args.stopwords {
        config.tokenizer = config.tokenizer.with_stopwords_file(stopwords.clone());
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&args.log)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting Burrow v{}", burrow::VERSION);
    let config = load_config(&args)?;

    match &args.command {
        Command::Build => build(&config),
        Command::Stats { top } => stats(&config, *top),
        Command::Query {
            text,
            mode,
            ranked,
            limit,
        } => {
            let mut query_config = QueryConfig::new(*mode);
            if *ranked {
                query_config = query_config.ranked();
            }
            query(&config, &query_config, text, *limit)
        }
        Command::Compare { queries } => compare(&config, queries),
    }
}

fn build(config: &IndexConfig) -> Result<()> {
    let (_, stats) = build_from_config(config).with_context(|| {
        format!(
            "failed to build {} from {}",
            config.index_path.display(),
            config.corpus_path.display()
        )
    })?;
    info!(
        "Indexed {} documents ({} postings) with {} merges into {:.2}KB",
        stats.documents,
        stats.postings,
        stats.merges,
        stats.index_bytes as f64 / 1024.0
    );
    Ok(())
}

fn stats(config: &IndexConfig, top: usize) -> Result<()> {
    let store = IndexStore::open(&config.index_path)
        .with_context(|| format!("failed to open {}", config.index_path.display()))?;
    let lookup = TermDictionary::build(&store)?;
    let stats = IndexStats::collect(&lookup, store.size_bytes()?, top);

    info!("~~ most frequent tokens ~~");
    for token in &stats.most_frequent {
        info!(
            "\"{}\" appeared {} times, postings start at {:.2}% of the file",
            token.token,
            token.posting_count,
            token.relative_offset * 100.0
        );
    }
    info!("~~ least frequent tokens ~~");
    for token in &stats.least_frequent {
        info!(
            "\"{}\" appeared {} times, postings start at {:.2}% of the file",
            token.token,
            token.posting_count,
            token.relative_offset * 100.0
        );
    }
    info!("Distinct tokens: {}", stats.vocabulary_size);
    info!("Index size: {:.2}KB", stats.index_bytes as f64 / 1024.0);
    match Corpus::open(&config.corpus_path).and_then(|c| c.size_bytes()) {
        Ok(size) => info!("Corpus size: {:.2}KB", size as f64 / 1024.0),
        Err(e) => warn!("Corpus size unavailable: {}", e),
    }
    Ok(())
}

fn query(config: &IndexConfig, query_config: &QueryConfig, text: &str, limit: usize) -> Result<()> {
    let corpus = Corpus::open(&config.corpus_path)?;
    let engine = open_query_engine(
        &config.index_path,
        Pipeline::from_config(&config.tokenizer)?,
        query_config.mode,
    )?;
    info!("Searching \"{}\" with {} scoring", text, engine.mode());

    let mut total = 0usize;
    let mut print = |matched: &ScoredDocument| -> Result<()> {
        if total < limit {
            let result = load_result(&corpus, matched)?;
            let reference = result
                .reference
                .unwrap_or_else(|| format!("document {}", result.document_id));
            match result.score {
                Some(score) => info!(" ~~ {} ({:.4}) ~~", reference, score),
                None => info!(" ~~ {} ~~", reference),
            }
            info!("[..] {} [..]", result.snippet);
        }
        total += 1;
        Ok(())
    };

    if query_config.ranked {
        for matched in &engine.ranked(text)? {
            print(matched)?;
        }
    } else {
        for matched in engine.query(text)? {
            print(&matched?)?;
        }
    }
    info!("This query matched {} documents.", total);
    Ok(())
}

fn compare(config: &IndexConfig, queries: &[String]) -> Result<()> {
    let corpus = Corpus::open(&config.corpus_path)?;
    let pipeline = Pipeline::from_config(&config.tokenizer)?;
    let engine = open_query_engine(
        &config.index_path,
        Pipeline::from_config(&config.tokenizer)?,
        ScoringMode::Boolean,
    )?;
    let scan = FullScan::new(&corpus, &pipeline);

    for (i, text) in queries.iter().enumerate() {
        let started = Instant::now();
        let indexed = engine.query(text)?.collect::<burrow::Result<Vec<_>>>()?;
        let index_time = started.elapsed();

        let started = Instant::now();
        let scanned = scan.query(text)?.collect::<burrow::Result<Vec<_>>>()?;
        let scan_time = started.elapsed();

        info!(
            "{}) \"{}\": index {:.3}s found {}, full scan {:.3}s found {}",
            i,
            text,
            index_time.as_secs_f64(),
            indexed.len(),
            scan_time.as_secs_f64(),
            scanned.len()
        );
        if indexed.len() != scanned.len() {
            warn!("\"{}\": index and full scan disagree", text);
        }
    }
    Ok(())
}
