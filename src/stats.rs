use crate::filter::DiscardRule;
use crate::page::PageCounts;
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics collected during the extraction process
#[derive(Debug, Default)]
pub struct ExtractionStats {
    pub pages_seen: AtomicU64,
    pub articles_extracted: AtomicU64,
    pub redirects_skipped: AtomicU64,
    pub other_namespace_skipped: AtomicU64,
    pub lines_discarded: [AtomicU64; DiscardRule::ALL.len()],
    pub paragraphs_kept: AtomicU64,
    pub paragraphs_too_short: AtomicU64,
    pub documents_written: AtomicU64,
}

impl ExtractionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_articles(&self) {
        self.articles_extracted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_discarded(&self, rule: DiscardRule) {
        self.lines_discarded[rule.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_paragraphs_kept(&self) {
        self.paragraphs_kept.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_paragraphs_too_short(&self) {
        self.paragraphs_too_short.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_documents(&self, count: u64) {
        self.documents_written.fetch_add(count, Ordering::Relaxed);
    }

    /// Mirrors the page reader's running totals.
    pub fn record_pages(&self, counts: PageCounts) {
        self.pages_seen.store(counts.pages, Ordering::Relaxed);
        self.redirects_skipped
            .store(counts.redirects_skipped, Ordering::Relaxed);
        self.other_namespace_skipped
            .store(counts.other_namespace_skipped, Ordering::Relaxed);
    }

    pub fn pages(&self) -> u64 {
        self.pages_seen.load(Ordering::Relaxed)
    }

    pub fn articles(&self) -> u64 {
        self.articles_extracted.load(Ordering::Relaxed)
    }

    pub fn redirects(&self) -> u64 {
        self.redirects_skipped.load(Ordering::Relaxed)
    }

    pub fn other_namespace(&self) -> u64 {
        self.other_namespace_skipped.load(Ordering::Relaxed)
    }

    pub fn discarded(&self, rule: DiscardRule) -> u64 {
        self.lines_discarded[rule.index()].load(Ordering::Relaxed)
    }

    pub fn total_discarded(&self) -> u64 {
        DiscardRule::ALL.iter().map(|rule| self.discarded(*rule)).sum()
    }

    pub fn paragraphs(&self) -> u64 {
        self.paragraphs_kept.load(Ordering::Relaxed)
    }

    pub fn too_short(&self) -> u64 {
        self.paragraphs_too_short.load(Ordering::Relaxed)
    }

    pub fn documents(&self) -> u64 {
        self.documents_written.load(Ordering::Relaxed)
    }

    /// One-line progress summary, used for spinner messages and fatal error context.
    pub fn summary(&self) -> String {
        format!(
            "{} pages seen, {} articles extracted, {} documents written",
            self.pages(),
            self.articles(),
            self.documents()
        )
    }
}
