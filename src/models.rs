use clap::ValueEnum;
use std::fmt;

/// Unit of text emitted as one output document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Granularity {
    /// One document per sentence
    #[default]
    Sentence,
    /// One document per paragraph line
    Paragraph,
    /// One document per page, paragraphs joined by a break marker
    #[value(alias = "page")]
    Article,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Granularity::Sentence => "sentence",
            Granularity::Paragraph => "paragraph",
            Granularity::Article => "article",
        };
        f.write_str(name)
    }
}

/// One `<page>` record from the dump.
///
/// `raw_lines` holds every trimmed line between the start and end markers,
/// metadata tags included; the paragraph filter separates prose from markup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// 1-based, counted on start markers
    pub ordinal: u64,
    pub namespace: Option<i32>,
    pub title: Option<String>,
    pub is_redirect: bool,
    pub raw_lines: Vec<String>,
}

impl Page {
    pub fn new(ordinal: u64) -> Self {
        Self {
            ordinal,
            ..Self::default()
        }
    }

    /// Only non-redirect pages in the target namespace contribute documents.
    pub fn qualifies(&self, namespace: i32) -> bool {
        !self.is_redirect && self.namespace == Some(namespace)
    }
}
