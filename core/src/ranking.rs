//! Per-document scoring strategies for document-at-a-time evaluation.

use crate::corpus::Corpus;
use crate::error::Error;
use crate::index::{InvertedIndex, Posting};
use crate::DocId;
use serde::Deserialize;
use std::str::FromStr;

/// Accumulates a relevance score for one document at a time.
///
/// The lifecycle is `reset(doc)`, then any number of `update` calls for
/// postings of that document, then `evaluate`. `evaluate` has no side
/// effects and can be called repeatedly.
pub trait Ranker {
    /// Start scoring `document_id`, discarding any previous state.
    fn reset(&mut self, document_id: DocId);

    /// Fold in one query term. `multiplicity` is how often the term occurs in the query.
    fn update(&mut self, term: &str, multiplicity: u32, posting: &Posting) -> Result<(), Error>;

    fn evaluate(&self) -> Result<f64, Error>;
}

fn check_document(current: Option<DocId>, posting: &Posting) -> Result<(), Error> {
    match current {
        None => Err(Error::RankerNotReset),
        Some(expected) if expected != posting.document_id => {
            Err(Error::RankerDocumentMismatch { expected, actual: posting.document_id })
        }
        Some(_) => Ok(()),
    }
}

/// Scores a document by the sum of `multiplicity * term_frequency`.
#[derive(Debug, Default, Clone)]
pub struct BrainDeadRanker {
    document_id: Option<DocId>,
    score: f64,
}

impl BrainDeadRanker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ranker for BrainDeadRanker {
    fn reset(&mut self, document_id: DocId) {
        self.document_id = Some(document_id);
        self.score = 0.0;
    }

    fn update(&mut self, _term: &str, multiplicity: u32, posting: &Posting) -> Result<(), Error> {
        check_document(self.document_id, posting)?;
        self.score += f64::from(multiplicity) * f64::from(posting.term_frequency);
        Ok(())
    }

    fn evaluate(&self) -> Result<f64, Error> {
        self.document_id.ok_or(Error::RankerNotReset)?;
        Ok(self.score)
    }
}

fn default_weight() -> f64 {
    1.0
}

fn default_static_field() -> String {
    "static_quality_score".to_owned()
}

/// Weights and field name for [`TfIdfRanker`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TfIdfConfig {
    #[serde(default = "default_weight")]
    pub dynamic_score_weight: f64,
    #[serde(default = "default_weight")]
    pub static_score_weight: f64,
    /// Numeric document field holding the static quality prior.
    #[serde(default = "default_static_field")]
    pub static_score_field: String,
}

impl Default for TfIdfConfig {
    fn default() -> Self {
        Self {
            dynamic_score_weight: default_weight(),
            static_score_weight: default_weight(),
            static_score_field: default_static_field(),
        }
    }
}

/// TF-IDF with a static per-document prior.
///
/// `score = static_weight * static + dynamic_weight * Σ multiplicity * tf * log10(N / df)`,
/// where a missing or non-numeric static field counts as 0.
pub struct TfIdfRanker<'a> {
    corpus: &'a dyn Corpus,
    index: &'a InvertedIndex,
    config: TfIdfConfig,
    document_id: Option<DocId>,
    score: f64,
}

impl<'a> TfIdfRanker<'a> {
    pub fn new(corpus: &'a dyn Corpus, index: &'a InvertedIndex) -> Self {
        Self::with_config(corpus, index, TfIdfConfig::default())
    }

    pub fn with_config(corpus: &'a dyn Corpus, index: &'a InvertedIndex, config: TfIdfConfig) -> Self {
        Self { corpus, index, config, document_id: None, score: 0.0 }
    }

    fn idf(&self, term: &str) -> Result<f64, Error> {
        let df = self.index.get_document_frequency(term);
        if df == 0 {
            return Err(Error::UnknownTerm(term.to_owned()));
        }
        Ok((self.corpus.size() as f64 / df as f64).log10())
    }
}

impl Ranker for TfIdfRanker<'_> {
    fn reset(&mut self, document_id: DocId) {
        self.document_id = Some(document_id);
        self.score = 0.0;
    }

    fn update(&mut self, term: &str, multiplicity: u32, posting: &Posting) -> Result<(), Error> {
        check_document(self.document_id, posting)?;
        let idf = self.idf(term)?;
        self.score += f64::from(multiplicity) * f64::from(posting.term_frequency) * idf;
        Ok(())
    }

    fn evaluate(&self) -> Result<f64, Error> {
        let document_id = self.document_id.ok_or(Error::RankerNotReset)?;
        let document = self
            .corpus
            .get_document(document_id)
            .ok_or(Error::UnknownDocument(document_id))?;
        let static_score = document.number(&self.config.static_score_field).unwrap_or(0.0);
        Ok(self.config.static_score_weight * static_score + self.config.dynamic_score_weight * self.score)
    }
}

/// Ranking strategy selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankerKind {
    BrainDead,
    #[default]
    TfIdf,
}

impl RankerKind {
    pub fn build<'a>(self, corpus: &'a dyn Corpus, index: &'a InvertedIndex) -> Box<dyn Ranker + 'a> {
        match self {
            RankerKind::BrainDead => Box::new(BrainDeadRanker::new()),
            RankerKind::TfIdf => Box::new(TfIdfRanker::new(corpus, index)),
        }
    }
}

impl FromStr for RankerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brain-dead" | "braindead" => Ok(RankerKind::BrainDead),
            "tf-idf" | "tfidf" => Ok(RankerKind::TfIdf),
            other => Err(Error::UnknownRanker(other.to_owned())),
        }
    }
}
