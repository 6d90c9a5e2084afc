use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use wikicorpus::chunk::{chunk_documents, ChunkOptions};
use wikicorpus::config::{
    ExtractConfig, DEFAULT_NAMESPACE, DEFAULT_SAMPLE_ARTICLES, DOCUMENTS_PER_FILE,
    DOCUMENT_STORE_FILE, GARBAGE_MARKER, PARAGRAPH_BREAK_MARKER,
};
use wikicorpus::extract::{run_extraction, ExtractOptions, SampleOptions};
use wikicorpus::filter::DiscardRule;
use wikicorpus::models::Granularity;
use wikicorpus::stats::ExtractionStats;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "wikicorpus")]
#[command(about = "Turn Wikipedia dumps into a cleaned, tokenized text corpus")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract documents from a dump into the document store
    Extract(ExtractArgs),
    /// Shuffle the document store into compressed corpus files
    Chunk(ChunkArgs),
    /// Extract, then chunk
    Generate(GenerateArgs),
    /// Report how pages are distributed across namespaces
    Survey(SurveyArgs),
}

#[derive(Args)]
struct ExtractArgs {
    /// Path to the Wikipedia dump file (.xml.bz2 or plain .xml)
    #[arg(short, long)]
    input: String,

    /// Output directory for the document store
    #[arg(short, long)]
    output: String,

    /// Unit of text written as one document
    #[arg(long, value_enum, default_value_t = Granularity::Sentence)]
    granularity: Granularity,

    /// Namespace id of the pages to extract
    #[arg(long, default_value_t = DEFAULT_NAMESPACE, allow_hyphen_values = true)]
    namespace: i32,

    /// Token substituted for template fields that cannot be resolved
    #[arg(long, default_value = GARBAGE_MARKER)]
    garbage_marker: String,

    /// Token placed between paragraphs of an article document
    #[arg(long, default_value = PARAGRAPH_BREAK_MARKER)]
    paragraph_marker: String,

    /// Stop after this many articles (for testing)
    #[arg(long)]
    limit: Option<u64>,

    /// Write raw, filtered and processed sample files here instead of the document store
    #[arg(long)]
    sample_dir: Option<PathBuf>,

    /// Articles to process in sample mode
    #[arg(long, default_value_t = DEFAULT_SAMPLE_ARTICLES)]
    sample_articles: u64,

    /// Remove the output directory before starting
    #[arg(long)]
    clean: bool,
}

#[derive(Args)]
struct ChunkArgs {
    /// Directory containing the document store
    #[arg(short, long)]
    output: String,

    /// Directory for corpus files (defaults to <output>/corpus)
    #[arg(long)]
    corpus_dir: Option<PathBuf>,

    /// Documents per corpus file
    #[arg(long, default_value_t = DOCUMENTS_PER_FILE)]
    documents_per_file: usize,

    /// Seed for a reproducible shuffle
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct GenerateArgs {
    #[command(flatten)]
    extract: ExtractArgs,

    /// Directory for corpus files (defaults to <output>/corpus)
    #[arg(long)]
    corpus_dir: Option<PathBuf>,

    /// Documents per corpus file
    #[arg(long, default_value_t = DOCUMENTS_PER_FILE)]
    documents_per_file: usize,

    /// Seed for a reproducible shuffle
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct SurveyArgs {
    /// Path to the Wikipedia dump file
    #[arg(short, long)]
    input: String,

    /// CSV destination (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn print_summary(stats: &ExtractionStats, duration_secs: f64) {
    println!();
    println!("=== Summary ===");
    println!("Extraction time:    {:.2}s", duration_secs);
    println!();
    println!("Pages seen:         {}", stats.pages());
    println!("Articles extracted: {}", stats.articles());
    println!("Redirects skipped:  {}", stats.redirects());
    println!("Other namespaces:   {}", stats.other_namespace());
    println!("Paragraphs kept:    {}", stats.paragraphs());
    println!("Too short:          {}", stats.too_short());
    println!("Documents written:  {}", stats.documents());
    println!("Lines discarded:    {}", stats.total_discarded());
    for rule in DiscardRule::ALL {
        println!("  {:<20} {}", rule.name(), stats.discarded(rule));
    }
}

fn run_extract(args: &ExtractArgs) -> Result<()> {
    if args.clean {
        let output_path = Path::new(&args.output);
        if output_path.exists() {
            info!("Cleaning output directory: {}", args.output);
            fs::remove_dir_all(output_path)
                .with_context(|| format!("Failed to clean output directory: {}", args.output))?;
        }
    }

    let config = ExtractConfig {
        namespace: args.namespace,
        garbage_marker: args.garbage_marker.clone(),
        paragraph_break: args.paragraph_marker.clone(),
        ..ExtractConfig::new(args.granularity)
    };
    let options = ExtractOptions {
        limit: args.limit,
        sample: args.sample_dir.as_ref().map(|dir| SampleOptions {
            dir: dir.clone(),
            articles: args.sample_articles,
        }),
    };

    let start = Instant::now();
    let stats = run_extraction(&args.input, &args.output, &config, &options)?;
    let duration = start.elapsed();
    info!(duration_secs = duration.as_secs_f64(), "Extraction complete");

    print_summary(&stats, duration.as_secs_f64());
    Ok(())
}

fn run_chunk(
    output: &str,
    corpus_dir: Option<&Path>,
    documents_per_file: usize,
    seed: Option<u64>,
) -> Result<()> {
    let store = Path::new(output).join(DOCUMENT_STORE_FILE);
    let corpus_dir = corpus_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Path::new(output).join("corpus"));
    let options = ChunkOptions {
        documents_per_file,
        seed,
    };

    let start = Instant::now();
    let summary = chunk_documents(&store, &corpus_dir, &options)?;

    println!();
    println!("=== Corpus ===");
    println!("Chunk time:         {:.2}s", start.elapsed().as_secs_f64());
    println!("Documents:          {}", summary.documents);
    println!("Files written:      {}", summary.files.len());
    println!("Corpus directory:   {}", corpus_dir.display());
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    run_extract(&args.extract)?;
    if args.extract.sample_dir.is_some() {
        info!("Sample mode wrote no document store, skipping chunk pass");
        return Ok(());
    }
    run_chunk(
        &args.extract.output,
        args.corpus_dir.as_deref(),
        args.documents_per_file,
        args.seed,
    )
}

fn run_survey(args: SurveyArgs) -> Result<()> {
    let survey = wikicorpus::survey::survey_dump(&args.input)?;
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create survey file: {}", path.display()))?;
            survey.write_csv(BufWriter::new(file))?;
            info!(path = %path.display(), "Survey written");
        }
        None => survey.write_csv(io::stdout().lock())?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Commands::Extract(args) => run_extract(&args),
        Commands::Chunk(args) => run_chunk(
            &args.output,
            args.corpus_dir.as_deref(),
            args.documents_per_file,
            args.seed,
        ),
        Commands::Generate(args) => run_generate(args),
        Commands::Survey(args) => run_survey(args),
    };

    match result {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
