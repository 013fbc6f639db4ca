use crate::DocId;

/// Errors raised by the retrieval core.
///
/// Lookup misses (unknown terms, empty queries) are not errors; everything
/// here is a caller mistake that would otherwise produce wrong scores.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// `match_threshold` outside (0, 1].
    #[error("match_threshold must be in (0, 1], got {0}")]
    InvalidMatchThreshold(f64),
    /// `hit_count` of zero.
    #[error("hit_count must be a positive integer")]
    InvalidHitCount,
    /// `update` or `evaluate` called before the first `reset`.
    #[error("ranker used before reset")]
    RankerNotReset,
    /// `update` received a posting for a document other than the one being scored.
    #[error("ranker is scoring document {expected} but received a posting for document {actual}")]
    RankerDocumentMismatch { expected: DocId, actual: DocId },
    /// IDF requested for a term that has no postings.
    #[error("term {0:?} does not occur in the index")]
    UnknownTerm(String),
    /// Document id not present in the corpus.
    #[error("document {0} not found in corpus")]
    UnknownDocument(DocId),
    #[error("dictionary exhausted the term id space")]
    DictionaryFull,
    #[error("training set contains no documents")]
    EmptyTrainingSet,
    #[error("unknown ranker {0:?}, expected \"brain-dead\" or \"tf-idf\"")]
    UnknownRanker(String),
}
