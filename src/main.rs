use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use wiktionary_etymology::dump::open_dump;
use wiktionary_etymology::output::OutputFormat;
use wiktionary_etymology::parallel::{self, ExtractConfig, ParallelConfig, Strategy};
use wiktionary_etymology::{EtymologyGraph, LanguageTable, Word};

#[derive(Parser)]
#[command(name = "wiktionary-etymology")]
#[command(about = "Extract etymology relations from Wiktionary dumps and resolve word ancestry")]
struct Args {
    /// Log diagnostics (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract relation records from a dump
    Extract {
        /// Input XML file (.xml or .xml.bz2)
        input: PathBuf,

        /// Output relations file
        output: PathBuf,

        /// Processing strategy
        #[arg(short, long, value_enum, default_value_t = Strategy::ChannelPipeline)]
        strategy: Strategy,

        /// Number of threads (0 = auto-detect)
        #[arg(short, long, default_value_t = 4)]
        threads: usize,

        /// Batch size for batch-parallel strategy
        #[arg(long, default_value_t = 1000)]
        batch_size: usize,

        /// Channel buffer size for channel-pipeline strategy
        #[arg(long, default_value_t = 10000)]
        channel_buffer: usize,

        /// Limit number of pages to scan (for testing with raw dumps)
        #[arg(long)]
        page_limit: Option<usize>,

        /// Output line format
        #[arg(long, value_enum, default_value_t = OutputFormat::Tsv)]
        format: OutputFormat,

        /// Path to language table YAML (default: schema/languages.yaml, else built-in)
        #[arg(long)]
        languages: Option<PathBuf>,

        /// Quiet mode - minimal output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the ancestry tree of a word as JSON
    Lookup {
        /// Relations file (`<lang>: <word>\trel:...\t<lang>: <word>` lines)
        relations: PathBuf,

        /// Language code of the word
        language: String,

        /// The word to resolve
        word: String,

        /// Stop expanding below this depth
        #[arg(long)]
        max_depth: Option<usize>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Command::Extract {
            input,
            output,
            strategy,
            threads,
            batch_size,
            channel_buffer,
            page_limit,
            format,
            languages,
            quiet,
        } => {
            let mut parallel_config = ParallelConfig::with_threads(threads);
            parallel_config.batch_size = batch_size.max(1);
            parallel_config.channel_buffer = channel_buffer;

            let config = ExtractConfig { format, page_limit };
            run_extract(input, output, strategy, languages, &parallel_config, &config, quiet)
        }
        Command::Lookup {
            relations,
            language,
            word,
            max_depth,
        } => run_lookup(relations, Word::new(language, word), max_depth),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_extract(
    input: PathBuf,
    output: PathBuf,
    strategy: Strategy,
    languages: Option<PathBuf>,
    parallel_config: &ParallelConfig,
    config: &ExtractConfig,
    quiet: bool,
) -> wiktionary_etymology::Result<()> {
    let languages = Arc::new(LanguageTable::load_or_builtin(languages.as_deref())?);

    if !quiet {
        println!("Parsing: {}", input.display());
        println!("Output: {}", output.display());
        println!("Strategy: {:?}", strategy);
        if strategy != Strategy::Sequential {
            println!("Threads: {}", parallel_config.num_threads);
        }
        println!("Languages: {}", languages.len());
        if let Some(limit) = config.page_limit {
            println!("Page limit: {}", limit);
        }
        println!();
    }

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
            pb.set_style(style);
        }
        pb
    };

    let reader = open_dump(&input)?;
    let writer = File::create(&output)?;
    let stats = parallel::run(strategy, reader, writer, languages, parallel_config, config, &progress)?;
    progress.finish_and_clear();

    if !quiet {
        stats.print(&format!("{:?}", strategy));
    }

    Ok(())
}

fn run_lookup(relations: PathBuf, word: Word, max_depth: Option<usize>) -> wiktionary_etymology::Result<()> {
    let file = File::open(&relations)?;
    let graph = EtymologyGraph::from_reader(BufReader::with_capacity(256 * 1024, file))?;
    tracing::info!(
        edges = graph.edge_count(),
        duplicates = graph.duplicate_derivations(),
        "loaded etymology graph"
    );

    let node = graph.lookup_bounded(&word, max_depth);
    println!("{}", serde_json::to_string_pretty(&node)?);
    Ok(())
}
