use crate::models::Granularity;

/// Page boundary markers, matched against whole trimmed lines
pub const PAGE_START: &str = "<page>";
pub const PAGE_END: &str = "</page>";

/// Prefix of the line marking a page as a redirect
pub const REDIRECT_PREFIX: &str = "<redirect title=";

/// Namespace of ordinary subject articles
pub const DEFAULT_NAMESPACE: i32 = 0;

/// Paragraphs shorter than this (in characters) after link/template resolution yield nothing
pub const MIN_PARAGRAPH_CHARS: usize = 100;

/// Escaped-tag lines at or above this length are not discarded as markup
pub const ESCAPED_TAG_MAX_CHARS: usize = 100;

/// Substituted for template fields that cannot be resolved
pub const GARBAGE_MARKER: &str = "evmprocessgarbagemarker";

/// Separates paragraphs inside an article-granularity document
pub const PARAGRAPH_BREAK_MARKER: &str = "evmparagraphbreakmarker";

/// Progress update interval (tick every N pages)
pub const PROGRESS_INTERVAL: u64 = 100_000;

/// Documents per compressed corpus file
pub const DOCUMENTS_PER_FILE: usize = 1_000_000;

/// Intermediate document store, one document per line
pub const DOCUMENT_STORE_FILE: &str = "documents.txt";

/// Qualifying pages written in sample mode unless overridden
pub const DEFAULT_SAMPLE_ARTICLES: u64 = 100;

/// Deleted outright from paragraphs before sentence splitting
pub const EXCLUDED_PUNCTUATION: &str = "#$&*+<=>@[\\]^_`{|}~%";

/// Padded with spaces after splitting so each occurrence becomes its own token
pub const INCLUDED_PUNCTUATION: &str = "-()/;,:!.?'";

/// A set of ASCII punctuation characters.
///
/// Lookup is a 128-bit mask so membership checks stay branch-free in the
/// per-character loops of the normalizer and splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PunctuationSet {
    mask: u128,
}

impl PunctuationSet {
    pub fn new(chars: &str) -> Self {
        chars.chars().fold(Self::default(), Self::with)
    }

    pub fn with(mut self, c: char) -> Self {
        if c.is_ascii() {
            self.mask |= 1u128 << (c as u32);
        }
        self
    }

    pub fn contains(&self, c: char) -> bool {
        c.is_ascii() && self.mask & (1u128 << (c as u32)) != 0
    }
}

/// Typed settings for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub granularity: Granularity,
    pub namespace: i32,
    pub garbage_marker: String,
    pub paragraph_break: String,
    pub excluded: PunctuationSet,
    pub included: PunctuationSet,
}

impl ExtractConfig {
    /// Defaults for `granularity`. Sentence documents drop double quotes;
    /// the coarser granularities keep them as tokens.
    pub fn new(granularity: Granularity) -> Self {
        let mut excluded = PunctuationSet::new(EXCLUDED_PUNCTUATION);
        let mut included = PunctuationSet::new(INCLUDED_PUNCTUATION);
        match granularity {
            Granularity::Sentence => excluded = excluded.with('"'),
            Granularity::Paragraph | Granularity::Article => included = included.with('"'),
        }

        Self {
            granularity,
            namespace: DEFAULT_NAMESPACE,
            garbage_marker: GARBAGE_MARKER.to_string(),
            paragraph_break: PARAGRAPH_BREAK_MARKER.to_string(),
            excluded,
            included,
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self::new(Granularity::Sentence)
    }
}
