//! Turns the sentences of a page into output documents at the configured
//! granularity.

use crate::config::ExtractConfig;
use crate::filter::discard_reason;
use crate::models::{Granularity, Page};
use crate::normalize::normalize;
use crate::sentence::split_sentences;
use crate::stats::ExtractionStats;

/// Largest candidate whose leading tokens must all be alphabetic.
const SHORT_DOCUMENT_TOKENS: usize = 4;

/// Rejection rule for one whitespace-tokenized candidate.
///
/// Single tokens are always dropped. Candidates of up to four tokens survive
/// only if every token but the last is made of ASCII letters, which keeps
/// short phrases like `he said yes .` and drops debris like `no 5th .`.
pub fn keep_document(candidate: &str) -> bool {
    let tokens: Vec<&str> = candidate.split_whitespace().collect();
    match tokens.len() {
        0 | 1 => false,
        n if n <= SHORT_DOCUMENT_TOKENS => tokens[..n - 1]
            .iter()
            .all(|token| token.bytes().all(|b| b.is_ascii_alphabetic())),
        _ => true,
    }
}

/// Collects the documents of one page, one normalized paragraph at a time.
pub struct DocumentAssembler<'a> {
    config: &'a ExtractConfig,
    documents: Vec<String>,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(config: &'a ExtractConfig) -> Self {
        Self {
            config,
            documents: Vec::new(),
        }
    }

    /// Splits `paragraph` into sentences and keeps those passing
    /// [`keep_document`]. Sentence granularity emits each one; the others
    /// rejoin the survivors into a single paragraph document, which must
    /// pass the rule again.
    pub fn push_paragraph(&mut self, paragraph: &str) {
        let kept = split_sentences(paragraph, &self.config.included)
            .into_iter()
            .filter(|sentence| keep_document(sentence));

        match self.config.granularity {
            Granularity::Sentence => self.documents.extend(kept),
            Granularity::Paragraph | Granularity::Article => {
                let joined = kept.collect::<Vec<_>>().join(" ");
                if keep_document(&joined) {
                    self.documents.push(joined);
                }
            }
        }
    }

    /// Article granularity folds every paragraph document into one,
    /// separated by the paragraph break marker.
    pub fn finish(self) -> Vec<String> {
        match self.config.granularity {
            Granularity::Article if !self.documents.is_empty() => {
                let separator = format!(" {} ", self.config.paragraph_break);
                let article = self.documents.join(&separator);
                if keep_document(&article) {
                    vec![article]
                } else {
                    Vec::new()
                }
            }
            _ => self.documents,
        }
    }
}

/// What one qualifying page produced.
#[derive(Debug, Default)]
pub struct PageOutput {
    /// Raw lines that passed the paragraph filter, before normalization
    pub paragraphs: Vec<String>,
    pub documents: Vec<String>,
}

/// Runs a page's raw lines through filter, normalizer, splitter and
/// assembler. Nothing carries over between pages.
pub fn page_documents(page: &Page, config: &ExtractConfig, stats: &ExtractionStats) -> PageOutput {
    let mut paragraphs = Vec::new();
    let mut assembler = DocumentAssembler::new(config);

    for line in &page.raw_lines {
        if let Some(rule) = discard_reason(line) {
            stats.inc_discarded(rule);
            continue;
        }
        match normalize(line, config) {
            Some(normalized) => {
                stats.inc_paragraphs_kept();
                assembler.push_paragraph(&normalized);
            }
            None => stats.inc_paragraphs_too_short(),
        }
        paragraphs.push(line.clone());
    }

    PageOutput {
        paragraphs,
        documents: assembler.finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PARAGRAPH_BREAK_MARKER;
    use crate::filter::DiscardRule;

    fn assemble(granularity: Granularity, paragraphs: &[&str]) -> Vec<String> {
        let config = ExtractConfig::new(granularity);
        let mut assembler = DocumentAssembler::new(&config);
        for paragraph in paragraphs {
            assembler.push_paragraph(paragraph);
        }
        assembler.finish()
    }

    #[test]
    fn single_token_is_dropped() {
        assert!(!keep_document("yes"));
        assert!(!keep_document(""));
    }

    #[test]
    fn short_alphabetic_phrases_are_kept() {
        assert!(keep_document("he said yes ."));
        assert!(keep_document("that way ."));
        assert!(keep_document("i guess so"));
    }

    #[test]
    fn short_candidates_with_symbols_are_dropped() {
        assert!(!keep_document("no 5th ."));
        assert!(!keep_document("( see below"));
        assert!(!keep_document("1889 ."));
    }

    #[test]
    fn final_token_may_be_anything() {
        assert!(keep_document("in 1889"));
    }

    #[test]
    fn non_ascii_letters_are_not_alphabetic() {
        assert!(!keep_document("café au lait ."));
    }

    #[test]
    fn longer_candidates_are_kept() {
        assert!(keep_document("built in 1889 for the fair ."));
    }

    #[test]
    fn every_kept_short_document_has_alphabetic_prefix() {
        let docs = assemble(
            Granularity::Sentence,
            &["yes. no 5th. he said yes. ok then. 42 is the answer. a b c d e f."],
        );
        assert_eq!(
            docs,
            vec![
                "yes .",
                "he said yes .",
                "ok then .",
                "42 is the answer .",
                "a b c d e f ."
            ]
        );
        for doc in &docs {
            let tokens: Vec<&str> = doc.split_whitespace().collect();
            if tokens.len() <= 4 {
                for token in &tokens[..tokens.len() - 1] {
                    assert!(token.chars().all(|c| c.is_ascii_alphabetic()));
                }
            }
        }
    }

    #[test]
    fn sentence_granularity_emits_each_sentence() {
        let docs = assemble(
            Granularity::Sentence,
            &["the first sentence is here. the second follows it."],
        );
        assert_eq!(
            docs,
            vec!["the first sentence is here .", "the second follows it ."]
        );
    }

    #[test]
    fn paragraph_granularity_rejoins_surviving_sentences() {
        let docs = assemble(
            Granularity::Paragraph,
            &[
                "the first sentence is here. 5th. the second follows it.",
                "another paragraph entirely.",
            ],
        );
        assert_eq!(
            docs,
            vec![
                "the first sentence is here . the second follows it .",
                "another paragraph entirely ."
            ]
        );
    }

    #[test]
    fn paragraph_with_no_survivors_yields_nothing() {
        assert!(assemble(Granularity::Paragraph, &["5th. 7."]).is_empty());
    }

    #[test]
    fn rejoined_short_sentences_are_checked_again() {
        assert!(keep_document("yes ."));
        assert!(keep_document("ok ."));
        assert!(assemble(Granularity::Paragraph, &["yes. ok."]).is_empty());
        assert!(assemble(Granularity::Article, &["yes. ok."]).is_empty());
    }

    #[test]
    fn paragraph_shrunk_by_late_normalization_is_dropped() {
        for granularity in [Granularity::Paragraph, Granularity::Article] {
            let config = ExtractConfig::new(granularity);
            let paragraph = format!("Yes. Ok.{}", "%".repeat(100));
            let normalized = normalize(&paragraph, &config).unwrap();
            assert_eq!(normalized, "yes. ok.");

            let mut assembler = DocumentAssembler::new(&config);
            assembler.push_paragraph(&normalized);
            let documents = assembler.finish();
            for document in &documents {
                assert!(keep_document(document), "{}", document);
            }
            assert!(documents.is_empty());
        }
    }

    #[test]
    fn article_granularity_joins_paragraphs_with_marker() {
        let docs = assemble(
            Granularity::Article,
            &["the first paragraph is here.", "the second paragraph is here."],
        );
        assert_eq!(
            docs,
            vec![format!(
                "the first paragraph is here . {} the second paragraph is here .",
                PARAGRAPH_BREAK_MARKER
            )]
        );
    }

    #[test]
    fn article_with_no_paragraphs_yields_nothing() {
        assert!(assemble(Granularity::Article, &[]).is_empty());
        assert!(assemble(Granularity::Article, &["5th."]).is_empty());
    }

    fn page(lines: &[&str]) -> Page {
        let mut page = Page::new(1);
        page.namespace = Some(0);
        page.raw_lines = lines.iter().map(|l| l.to_string()).collect();
        page
    }

    const LONG_PROSE: &str = "The '''Eiffel Tower''' is a [[wrought iron|wrought-iron]] lattice tower on the Champ de Mars in [[Paris]], France. It is named after the engineer Gustave Eiffel.";

    #[test]
    fn page_driver_filters_normalizes_and_counts() {
        let stats = ExtractionStats::new();
        let page = page(&[
            "<title>Eiffel Tower</title>",
            "<ns>0</ns>",
            "{{Infobox building",
            "| name = Eiffel Tower",
            "}}",
            LONG_PROSE,
            "== History ==",
            "Too short to keep.",
        ]);
        let output = page_documents(&page, &ExtractConfig::new(Granularity::Sentence), &stats);

        assert_eq!(output.paragraphs, vec![LONG_PROSE, "Too short to keep."]);
        assert_eq!(
            output.documents,
            vec![
                "the eiffel tower is a wrought - iron lattice tower on the champ de mars in paris , france .",
                "it is named after the engineer gustave eiffel ."
            ]
        );
        assert_eq!(stats.discarded(DiscardRule::XmlTag), 2);
        assert_eq!(stats.discarded(DiscardRule::TemplateOpening), 1);
        assert_eq!(stats.discarded(DiscardRule::TableMarkup), 1);
        assert_eq!(stats.discarded(DiscardRule::TemplateClose), 1);
        assert_eq!(stats.discarded(DiscardRule::SectionHeader), 1);
        assert_eq!(stats.paragraphs(), 1);
        assert_eq!(stats.too_short(), 1);
    }

    #[test]
    fn page_driver_article_granularity() {
        let stats = ExtractionStats::new();
        let page = page(&[LONG_PROSE, LONG_PROSE]);
        let output = page_documents(&page, &ExtractConfig::new(Granularity::Article), &stats);
        assert_eq!(output.documents.len(), 1);
        assert_eq!(
            output.documents[0].matches(PARAGRAPH_BREAK_MARKER).count(),
            1
        );
    }

    #[test]
    fn page_without_prose_yields_nothing() {
        let stats = ExtractionStats::new();
        let page = page(&["<title>Empty</title>", "<ns>0</ns>", "[[Category:Stubs]]"]);
        let output = page_documents(&page, &ExtractConfig::default(), &stats);
        assert!(output.paragraphs.is_empty());
        assert!(output.documents.is_empty());
    }

    #[test]
    fn quotes_survive_outside_sentence_granularity() {
        let docs = assemble(Granularity::Paragraph, &["he said \"yes.\" and left town."]);
        assert_eq!(docs, vec!["he said \" yes . \" and left town ."]);
    }
}
