//! # GCS CLI
//!
//! Build a filter from a word list and query it:
//!
//! ```text
//! gcs build /usr/share/dict/words
//! gcs query hello wrold
//! gcs info
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};

use gcs_core::config::{Config, LogFormat, LoggingConfig};
use gcs_core::stats::format_bytes;
use gcs_filter::{write_filter, GcsBuilder, GcsQuery};

#[derive(Parser)]
#[command(name = "gcs")]
#[command(about = "Build and query Golomb-coded sets", version)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Build a filter from a file with one word per line
    Build {
        wordlist: PathBuf,
        /// Output filter file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Inverse false-positive rate, a power of two
        #[arg(short)]
        p: Option<u32>,
        /// Print build statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Query words against a filter
    Query {
        /// Filter file
        #[arg(short, long)]
        filter: Option<PathBuf>,
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Show the parameters of a filter
    Info {
        /// Filter file
        #[arg(short, long)]
        filter: Option<PathBuf>,
    },
}

fn init_logging(logging: &LoggingConfig, verbose: u8) {
    let level = (0..verbose).fold(logging.level, |level, _| level.more_verbose());
    let builder = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(level))
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Text => builder.init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

fn read_words(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("Cannot open file: {}", path.display()))?;

    let mut words = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.with_context(|| format!("Cannot read {}", path.display()))?;
        let word = line.trim();
        if !word.is_empty() {
            words.push(word.to_string());
        }
    }
    Ok(words)
}

fn build(wordlist: &Path, output: &Path, p: u32, json: bool) -> Result<()> {
    let words = read_words(wordlist)?;
    if words.is_empty() {
        bail!("{} contains no words", wordlist.display());
    }
    debug!("Read {} words from {:?}", words.len(), wordlist);

    let n = u32::try_from(words.len()).context("Too many words for a 32-bit N")?;
    let mut builder = GcsBuilder::new(n, p)?;
    builder.extend(&words);
    let (filter, stats) = builder.finish()?;
    write_filter(output, &filter)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Number of words: {}", stats.items_added);
        println!("False positives: {:.6}", stats.false_positive_rate);
        println!("Size: {} ({})", stats.filter_bytes, format_bytes(stats.filter_bytes));
        println!("Bits per word: {:.6}", stats.bits_per_item);
    }

    info!("Filter written to {:?}", output);
    Ok(())
}

fn query(filter: &Path, words: &[String]) -> Result<()> {
    let gcs = GcsQuery::open(filter).with_context(|| format!("Cannot open table: {}", filter.display()))?;

    for word in words {
        let found = gcs.query(word);
        println!("Querying for \"{}\": {}", word, if found { "TRUE" } else { "FALSE" });
    }
    Ok(())
}

fn show_info(filter: &Path) -> Result<()> {
    let gcs = GcsQuery::open(filter).with_context(|| format!("Cannot open table: {}", filter.display()))?;
    let params = gcs.params();
    let stored = gcs.values().count();

    println!("N: {}", params.n());
    println!("P: {}", params.p());
    println!("Stored values: {}", stored);
    println!("Size: {}", format_bytes(gcs.as_bytes().len() as u64));
    println!("False positives: {:.6}", params.false_positive_rate());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Cannot load config: {}", path.display()))?,
        None => Config::default(),
    };
    init_logging(&config.logging, cli.verbose);

    match cli.command {
        Commands::Build { wordlist, output, p, json } => {
            let output = output.unwrap_or_else(|| config.filter.output.clone());
            let p = p.unwrap_or(config.filter.p);
            build(&wordlist, &output, p, json)
        }
        Commands::Query { filter, words } => {
            let filter = filter.unwrap_or_else(|| config.filter.output.clone());
            query(&filter, &words)
        }
        Commands::Info { filter } => {
            let filter = filter.unwrap_or_else(|| config.filter.output.clone());
            show_info(&filter)
        }
    }
}
