use crate::assemble::{page_documents, PageOutput};
use crate::config::{ExtractConfig, DOCUMENT_STORE_FILE, PROGRESS_INTERVAL};
use crate::dump::open_dump;
use crate::models::Page;
use crate::page::{PageReader, PageSelection};
use crate::stats::ExtractionStats;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const WRITE_BUFFER_BYTES: usize = 128 * 1024;

/// Writes inspection files instead of the document store.
#[derive(Debug, Clone)]
pub struct SampleOptions {
    pub dir: PathBuf,
    /// Qualifying pages to process before stopping
    pub articles: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Stop after this many qualifying pages
    pub limit: Option<u64>,
    pub sample: Option<SampleOptions>,
}

impl ExtractOptions {
    fn article_limit(&self) -> Option<u64> {
        let sample_limit = self.sample.as_ref().map(|s| s.articles);
        match (self.limit, sample_limit) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

enum DocumentSink {
    /// One document per line, flushed after every page
    Store(BufWriter<File>),
    /// Raw page lines, filtered paragraphs, and documents separated by blank lines
    Sample {
        raw: BufWriter<File>,
        filtered: BufWriter<File>,
        processed: BufWriter<File>,
    },
}

fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    Ok(BufWriter::with_capacity(WRITE_BUFFER_BYTES, file))
}

impl DocumentSink {
    fn open(output_dir: &str, sample: Option<&SampleOptions>) -> Result<Self> {
        match sample {
            Some(sample) => {
                fs::create_dir_all(&sample.dir).with_context(|| {
                    format!("Failed to create sample directory: {}", sample.dir.display())
                })?;
                Ok(DocumentSink::Sample {
                    raw: create_writer(&sample.dir.join("raw.txt"))?,
                    filtered: create_writer(&sample.dir.join("filtered.txt"))?,
                    processed: create_writer(&sample.dir.join("processed.txt"))?,
                })
            }
            None => {
                fs::create_dir_all(output_dir).with_context(|| {
                    format!("Failed to create output directory: {}", output_dir)
                })?;
                let path = Path::new(output_dir).join(DOCUMENT_STORE_FILE);
                Ok(DocumentSink::Store(create_writer(&path)?))
            }
        }
    }

    fn write_page(&mut self, page: &Page, output: &PageOutput) -> io::Result<()> {
        match self {
            DocumentSink::Store(store) => {
                for document in &output.documents {
                    writeln!(store, "{}", document)?;
                }
                store.flush()
            }
            DocumentSink::Sample {
                raw,
                filtered,
                processed,
            } => {
                for line in &page.raw_lines {
                    writeln!(raw, "{}", line)?;
                }
                for paragraph in &output.paragraphs {
                    writeln!(filtered, "{}", paragraph)?;
                }
                for document in &output.documents {
                    writeln!(processed, "{}\n", document)?;
                }
                Ok(())
            }
        }
    }

    fn finish(self) -> io::Result<()> {
        match self {
            DocumentSink::Store(mut store) => store.flush(),
            DocumentSink::Sample {
                mut raw,
                mut filtered,
                mut processed,
            } => {
                raw.flush()?;
                filtered.flush()?;
                processed.flush()
            }
        }
    }
}

/// Streams `input` into `<output_dir>/documents.txt`, one document per line.
///
/// A nesting violation in the dump aborts the run; the returned error carries
/// the counters reached so far.
pub fn run_extraction(
    input: &str,
    output_dir: &str,
    config: &ExtractConfig,
    options: &ExtractOptions,
) -> Result<ExtractionStats> {
    let stream = open_dump(input)?;
    let mut sink = DocumentSink::open(output_dir, options.sample.as_ref())?;
    let mut reader = PageReader::new(stream, PageSelection::Namespace(config.namespace));
    let limit = options.article_limit();

    let stats = ExtractionStats::new();
    let pb = ProgressBar::new_spinner();
    let mut next_progress = PROGRESS_INTERVAL;

    info!(
        input,
        granularity = %config.granularity,
        namespace = config.namespace,
        "Starting extraction"
    );

    while let Some(result) = reader.next() {
        stats.record_pages(reader.counts());
        let page =
            result.with_context(|| format!("Extraction aborted after {}", stats.summary()))?;

        stats.inc_articles();
        let output = page_documents(&page, config, &stats);
        sink.write_page(&page, &output)
            .context("Failed to write documents")?;
        stats.add_documents(output.documents.len() as u64);

        if stats.pages() >= next_progress {
            let message = format!(
                "Extracted article {}: {} documents generated",
                stats.articles(),
                stats.documents()
            );
            info!("{}", message);
            pb.set_message(message);
            pb.tick();
            next_progress = stats.pages() - stats.pages() % PROGRESS_INTERVAL + PROGRESS_INTERVAL;
        }

        if limit.is_some_and(|limit| stats.articles() >= limit) {
            debug!(articles = stats.articles(), "Article limit reached");
            break;
        }
    }

    stats.record_pages(reader.counts());
    pb.finish_and_clear();
    sink.finish().context("Failed to flush documents")?;

    info!(
        pages = stats.pages(),
        articles = stats.articles(),
        redirects = stats.redirects(),
        other_namespace = stats.other_namespace(),
        documents = stats.documents(),
        "Extraction complete"
    );

    Ok(stats)
}
