//! Shuffles the document store and splits it into compressed corpus files.
//!
//! The whole store is loaded into memory: a global shuffle needs every
//! document visible at once.

use crate::config::DOCUMENTS_PER_FILE;
use anyhow::{bail, Context, Result};
use bzip2::write::BzEncoder;
use bzip2::Compression;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ChunkOptions {
    pub documents_per_file: usize,
    /// Fixes the shuffle order; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            documents_per_file: DOCUMENTS_PER_FILE,
            seed: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ChunkSummary {
    pub documents: usize,
    /// Written files in index order
    pub files: Vec<PathBuf>,
}

/// `corpus_file_003_of_150.bz2`: 1-based index, zero-padded to three digits.
pub fn chunk_file_name(index: usize, total: usize) -> String {
    format!("corpus_file_{:03}_of_{}.bz2", index, total)
}

fn load_documents(store_path: &Path) -> Result<Vec<String>> {
    let file = File::open(store_path)
        .with_context(|| format!("Failed to open document store: {}", store_path.display()))?;
    let mut documents = Vec::new();
    for line in BufReader::with_capacity(256 * 1024, file).lines() {
        let line = line
            .with_context(|| format!("Failed to read document store: {}", store_path.display()))?;
        if !line.is_empty() {
            documents.push(line);
        }
    }
    Ok(documents)
}

fn write_chunk(path: &Path, documents: &[String]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create corpus file: {}", path.display()))?;
    let mut encoder = BzEncoder::new(BufWriter::new(file), Compression::default());
    for document in documents {
        writeln!(encoder, "{}", document)?;
    }
    encoder
        .finish()
        .and_then(|mut writer| writer.flush())
        .with_context(|| format!("Failed to finish corpus file: {}", path.display()))?;
    Ok(())
}

/// Shuffles every document in `store_path` and writes them in batches of
/// `documents_per_file` to bzip2 text files under `output_dir`, one document
/// per line. The last batch holds the remainder.
pub fn chunk_documents(
    store_path: &Path,
    output_dir: &Path,
    options: &ChunkOptions,
) -> Result<ChunkSummary> {
    if options.documents_per_file == 0 {
        bail!("documents per file must be at least 1");
    }

    let mut documents = load_documents(store_path)?;
    if documents.is_empty() {
        warn!(store = %store_path.display(), "Document store is empty, no corpus files written");
        return Ok(ChunkSummary::default());
    }

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    documents.shuffle(&mut rng);

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create corpus directory: {}", output_dir.display()))?;

    let total = documents.len().div_ceil(options.documents_per_file);
    info!(
        documents = documents.len(),
        files = total,
        "Writing corpus files"
    );

    let pb = ProgressBar::new(total as u64);
    pb.set_style(ProgressStyle::with_template(
        "{spinner:.green} [{bar:40}] {pos}/{len} corpus files [{elapsed}]",
    )?);

    let files = documents
        .par_chunks(options.documents_per_file)
        .enumerate()
        .map(|(i, batch)| {
            let path = output_dir.join(chunk_file_name(i + 1, total));
            write_chunk(&path, batch)?;
            pb.inc(1);
            Ok(path)
        })
        .collect::<Result<Vec<_>>>()?;

    pb.finish_and_clear();
    info!(files = files.len(), "Corpus written");

    Ok(ChunkSummary {
        documents: documents.len(),
        files,
    })
}
