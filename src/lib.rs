//! Wikicorpus: Wikipedia dump to plain-text training corpus
//!
//! This crate streams a MediaWiki XML dump and turns the prose of its
//! articles into a cleaned, lowercase, whitespace-tokenized corpus:
//!
//! 1. **Extraction Pass** -- Frame the dump into pages line by line, keep
//!    non-redirect pages of the target namespace, filter markup lines out,
//!    normalize the remaining paragraphs and split them into documents
//!    written to an append-only document store
//! 2. **Chunk Pass** -- Shuffle the document store and write it as
//!    fixed-size bzip2 corpus files
//!
//! # Architecture
//!
//! - **No XML parser** -- Pages are framed by exact marker lines; only one
//!   page is held in memory at a time
//! - **Ordered heuristics** -- A chain of line predicates decides prose
//!   versus markup, then a fixed sequence of rewrites cleans the prose
//! - **Fail fast on framing** -- Unbalanced page markers abort the run;
//!   everything else degrades into dropped lines or a garbage token
//! - **Atomic counters** -- Per-rule discard counts and document totals
//!
//! # Key Modules
//!
//! - [`page`] -- Page state machine over the line stream
//! - [`filter`] -- Paragraph filter rules
//! - [`normalize`] -- Markup normalizer
//! - [`sentence`] -- Sentence splitter
//! - [`assemble`] -- Document assembly per granularity
//! - [`extract`] -- Extraction pass and sample output
//! - [`chunk`] -- Shuffled, compressed corpus files
//! - [`survey`] -- Namespace distribution report
//! - [`stats`] -- Extraction counters
//! - [`config`] -- Markers, tokens and punctuation tables
//!
//! # Example Usage
//!
//! ```bash
//! # Sentence documents from namespace 0
//! wikicorpus -v extract -i enwiki-latest-pages-articles.xml.bz2 -o data/
//!
//! # Shuffle into files of 1,000,000 documents
//! wikicorpus chunk -o data/ --seed 7
//! ```

pub mod assemble;
pub mod chunk;
pub mod config;
pub mod dump;
pub mod error;
pub mod extract;
pub mod filter;
pub mod models;
pub mod normalize;
pub mod page;
pub mod sentence;
pub mod stats;
pub mod survey;
