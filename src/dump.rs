use anyhow::{Context, Result};
use bzip2::read::MultiBzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

const READ_BUFFER_BYTES: usize = 1024 * 1024;

/// Decompressed dump bytes, buffered for line reads.
pub type DumpStream = BufReader<Box<dyn Read + Send>>;

/// Opens a dump for line-by-line reading. `.bz2` files are decoded as
/// multistream bzip2 (the format of `pages-articles-multistream` dumps);
/// anything else is read as plain XML.
pub fn open_dump(path: &str) -> Result<DumpStream> {
    let file =
        File::open(path).with_context(|| format!("Failed to open wiki dump at: {}", path))?;

    let inner: Box<dyn Read + Send> = if is_bz2(path) {
        debug!(path, "Reading bzip2 dump");
        Box::new(MultiBzDecoder::new(file))
    } else {
        debug!(path, "Reading plain XML dump");
        Box::new(file)
    };

    Ok(BufReader::with_capacity(READ_BUFFER_BYTES, inner))
}

fn is_bz2(path: &str) -> bool {
    Path::new(path)
        .extension()
        .map(|e| e.eq_ignore_ascii_case("bz2"))
        .unwrap_or(false)
}
