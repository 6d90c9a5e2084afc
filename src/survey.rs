//! Namespace distribution of a dump, for deciding which namespaces to extract.

use crate::config::PROGRESS_INTERVAL;
use crate::dump::open_dump;
use crate::models::Page;
use crate::page::{PageReader, PageSelection};
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::io::{BufRead, Write};
use tracing::info;

/// One CSV row. Only namespace 0 splits redirects into their own row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SurveyRow {
    /// Empty when the page had no `<ns>` line
    pub namespace: Option<i32>,
    pub redirect: bool,
    pub pages: u64,
}

#[derive(Debug, Default)]
pub struct NamespaceSurvey {
    counts: FxHashMap<(Option<i32>, bool), u64>,
    pages: u64,
}

impl NamespaceSurvey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, page: &Page) {
        let redirect = page.is_redirect && page.namespace == Some(0);
        *self.counts.entry((page.namespace, redirect)).or_insert(0) += 1;
        self.pages += 1;
    }

    pub fn pages(&self) -> u64 {
        self.pages
    }

    /// Rows ordered by namespace, plain pages before redirects.
    pub fn rows(&self) -> Vec<SurveyRow> {
        let mut rows: Vec<SurveyRow> = self
            .counts
            .iter()
            .map(|(&(namespace, redirect), &pages)| SurveyRow {
                namespace,
                redirect,
                pages,
            })
            .collect();
        rows.sort();
        rows
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for row in self.rows() {
            csv.serialize(row)?;
        }
        csv.flush()?;
        Ok(())
    }
}

/// Counts every page in a line stream, redirects and all namespaces included.
pub fn survey_pages<R: BufRead>(reader: R) -> Result<NamespaceSurvey> {
    let mut survey = NamespaceSurvey::new();
    let mut pages = PageReader::new(reader, PageSelection::AllTags);
    let pb = ProgressBar::new_spinner();

    while let Some(result) = pages.next() {
        let page = result
            .with_context(|| format!("Survey aborted after {} pages", survey.pages()))?;
        survey.record(&page);
        if survey.pages() % PROGRESS_INTERVAL == 0 {
            pb.set_message(format!("Surveyed {} pages", survey.pages()));
            pb.tick();
        }
    }

    pb.finish_and_clear();
    info!(
        pages = survey.pages(),
        namespaces = survey.rows().len(),
        "Survey complete"
    );
    Ok(survey)
}

pub fn survey_dump(input: &str) -> Result<NamespaceSurvey> {
    survey_pages(open_dump(input)?)
}
