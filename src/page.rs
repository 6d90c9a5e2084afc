//! Page framing over a line-oriented dump stream.
//!
//! The dump is never parsed as XML. Each line is trimmed and compared against
//! the page markers; everything between a start and end marker is
//! accumulated as the page's raw lines. Only one page is held in memory at a
//! time.

use crate::config::{PAGE_END, PAGE_START, REDIRECT_PREFIX};
use crate::error::{PageError, Result};
use crate::models::Page;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::BufRead;
use tracing::{trace, warn};

static NAMESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<ns>(-?\d+)</ns>$").unwrap());

static TITLE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<title>(.+?)</title>").unwrap());

/// Which closed pages the reader yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelection {
    /// Non-redirect pages in the given namespace
    Namespace(i32),
    /// Every page, redirects included, with tags only: `raw_lines` stays empty
    AllTags,
}

impl PageSelection {
    fn admits(&self, page: &Page) -> bool {
        match self {
            PageSelection::Namespace(ns) => page.qualifies(*ns),
            PageSelection::AllTags => true,
        }
    }

    /// False when the body is never read: the page's tags already rule it
    /// out, or only tags were asked for.
    fn keeps_body(&self, page: &Page) -> bool {
        match self {
            PageSelection::Namespace(ns) => {
                !page.is_redirect && page.namespace.map_or(true, |id| id == *ns)
            }
            PageSelection::AllTags => false,
        }
    }
}

enum ReaderState {
    OutsidePage,
    InsidePage { page: Page, opened_at: u64 },
}

/// Running totals of what the reader has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageCounts {
    pub lines: u64,
    pub pages: u64,
    pub redirects_skipped: u64,
    pub other_namespace_skipped: u64,
}

/// Streams [`Page`]s out of a dump, one line at a time.
///
/// Yields `Err` on the first structural violation and nothing afterwards.
pub struct PageReader<R> {
    reader: R,
    buf: Vec<u8>,
    state: ReaderState,
    selection: PageSelection,
    counts: PageCounts,
    finished: bool,
}

impl<R: BufRead> PageReader<R> {
    pub fn new(reader: R, selection: PageSelection) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(8192),
            state: ReaderState::OutsidePage,
            selection,
            counts: PageCounts::default(),
            finished: false,
        }
    }

    pub fn counts(&self) -> PageCounts {
        self.counts
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.counts.lines += 1;
        Ok(Some(String::from_utf8_lossy(&self.buf).trim().to_string()))
    }

    fn step(&mut self, line: String) -> Result<Option<Page>> {
        if line == PAGE_START {
            self.open_page()?;
            return Ok(None);
        }
        if line == PAGE_END {
            return self.close_page();
        }

        if let ReaderState::InsidePage { page, .. } = &mut self.state {
            if line.starts_with(REDIRECT_PREFIX) {
                page.is_redirect = true;
            } else if page.namespace.is_none() {
                if let Some(caps) = NAMESPACE_REGEX.captures(&line) {
                    page.namespace = caps[1].parse().ok();
                }
            }
            if page.title.is_none() {
                if let Some(caps) = TITLE_REGEX.captures(&line) {
                    page.title = Some(caps[1].to_string());
                }
            }
            if self.selection.keeps_body(page) {
                page.raw_lines.push(line);
            } else if !page.raw_lines.is_empty() {
                page.raw_lines = Vec::new();
            }
        }
        Ok(None)
    }

    fn open_page(&mut self) -> Result<()> {
        if let ReaderState::InsidePage { opened_at, .. } = self.state {
            return Err(PageError::UnexpectedPageStart {
                line: self.counts.lines,
                opened_at,
            });
        }
        self.counts.pages += 1;
        self.state = ReaderState::InsidePage {
            page: Page::new(self.counts.pages),
            opened_at: self.counts.lines,
        };
        Ok(())
    }

    fn close_page(&mut self) -> Result<Option<Page>> {
        match std::mem::replace(&mut self.state, ReaderState::OutsidePage) {
            ReaderState::OutsidePage => Err(PageError::UnexpectedPageEnd {
                line: self.counts.lines,
            }),
            ReaderState::InsidePage { page, .. } => {
                if self.selection.admits(&page) {
                    return Ok(Some(page));
                }
                if page.is_redirect {
                    self.counts.redirects_skipped += 1;
                } else {
                    self.counts.other_namespace_skipped += 1;
                }
                trace!(ordinal = page.ordinal, title = ?page.title, "Skipping page");
                Ok(None)
            }
        }
    }
}

impl<R: BufRead> Iterator for PageReader<R> {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let step = match self.read_line() {
                Ok(Some(line)) => self.step(line),
                Ok(None) => {
                    self.finished = true;
                    if let ReaderState::InsidePage { opened_at, .. } = self.state {
                        warn!(opened_at, "Input ended inside an unterminated page");
                    }
                    return None;
                }
                Err(e) => Err(e),
            };
            match step {
                Ok(Some(page)) => return Some(Ok(page)),
                Ok(None) => continue,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
