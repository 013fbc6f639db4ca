//! In-memory ranked retrieval for small corpora.
//!
//! The pieces, leaves first: an [`Analyzer`] turns raw text into terms, a
//! [`Dictionary`] maps terms to dense ids, the [`InvertedIndex`] keeps one
//! posting list per term, and the [`SearchEngine`] walks those lists
//! document-at-a-time, scoring candidates with a pluggable [`Ranker`] and
//! keeping the best ones in a [`Sieve`].
//!
//! Trie matching, suffix-array phrase search and a naive Bayes classifier
//! share the same analysis pipeline.

pub mod analyzer;
pub mod classifier;
pub mod corpus;
pub mod dictionary;
pub mod error;
pub mod index;
pub mod merge;
pub mod normalization;
pub mod ranking;
pub mod search;
pub mod sieve;
pub mod suffix_array;
pub mod tokenizer;
pub mod trie;

pub type TermId = u32;
pub type DocId = u32;

pub use analyzer::Analyzer;
pub use classifier::{Classification, NaiveBayesClassifier};
pub use corpus::{Corpus, Document, FieldValue, InMemoryCorpus};
pub use dictionary::Dictionary;
pub use error::Error;
pub use index::{InvertedIndex, Posting, PostingsIter};
pub use merge::PostingsMerger;
pub use ranking::{BrainDeadRanker, Ranker, RankerKind, TfIdfConfig, TfIdfRanker};
pub use search::{Hit, SearchEngine, SearchOptions};
pub use sieve::Sieve;
pub use suffix_array::{PhraseOptions, SuffixArray};
pub use trie::{Match, StringFinder, Trie};
