//! N-out-of-M ranked retrieval, evaluated document-at-a-time.

use crate::corpus::{Corpus, Document};
use crate::error::Error;
use crate::index::{InvertedIndex, Posting, PostingsIter};
use crate::merge::PostingsMerger;
use crate::ranking::Ranker;
use crate::sieve::Sieve;
use crate::DocId;
use serde::Deserialize;
use std::collections::HashMap;

fn default_match_threshold() -> f64 {
    1.0
}

/// Knobs for [`SearchEngine::evaluate`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchOptions {
    /// Fraction of the distinct query terms a document must contain, in (0, 1].
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
    /// Maximum number of hits; unbounded when absent.
    #[serde(default)]
    pub hit_count: Option<usize>,
    /// Log every candidate at debug level.
    #[serde(default)]
    pub debug: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { match_threshold: default_match_threshold(), hit_count: None, debug: false }
    }
}

impl SearchOptions {
    pub fn new(match_threshold: f64, hit_count: Option<usize>) -> Self {
        Self { match_threshold, hit_count, debug: false }
    }

    pub fn validate(&self) -> Result<(), Error> {
        // also rejects NaN
        if !(self.match_threshold > 0.0 && self.match_threshold <= 1.0) {
            return Err(Error::InvalidMatchThreshold(self.match_threshold));
        }
        if self.hit_count == Some(0) {
            return Err(Error::InvalidHitCount);
        }
        Ok(())
    }

    /// N: how many of `m` distinct terms a document needs.
    pub fn required_matches(&self, m: usize) -> usize {
        let n = (self.match_threshold * m as f64).floor() as usize;
        n.min(m).max(1)
    }
}

/// A scored document handed to the caller.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    pub score: f64,
    pub document: &'a Document,
}

struct Cursor<'a> {
    term: String,
    multiplicity: u32,
    postings: PostingsIter<'a>,
    current: Option<Posting>,
}

/// Query evaluation over a corpus and its index.
///
/// Cheap to construct; holds only borrows. Concurrent calls are fine as long
/// as each brings its own ranker.
#[derive(Clone, Copy)]
pub struct SearchEngine<'a> {
    corpus: &'a dyn Corpus,
    index: &'a InvertedIndex,
}

impl<'a> SearchEngine<'a> {
    pub fn new(corpus: &'a dyn Corpus, index: &'a InvertedIndex) -> Self {
        Self { corpus, index }
    }

    /// Distinct query terms with their multiplicities, in first-seen order.
    fn query_terms(&self, query: &str) -> Vec<(String, u32)> {
        let mut terms: Vec<(String, u32)> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();
        for term in self.index.get_terms(query) {
            match seen.get(&term) {
                Some(&i) => terms[i].1 += 1,
                None => {
                    seen.insert(term.clone(), terms.len());
                    terms.push((term, 1));
                }
            }
        }
        terms
    }

    /// Rank every document containing at least N of the M distinct query
    /// terms and pass the best ones to `callback`, best first.
    ///
    /// All posting cursors advance together in document order; each
    /// document is scored once with exactly one `update` per matching term.
    pub fn evaluate<F>(
        &self,
        query: &str,
        options: &SearchOptions,
        ranker: &mut dyn Ranker,
        mut callback: F,
    ) -> Result<(), Error>
    where
        F: FnMut(Hit<'a>),
    {
        options.validate()?;
        let terms = self.query_terms(query);
        let m = terms.len();
        if m == 0 {
            return Ok(());
        }
        let n = options.required_matches(m);

        let mut cursors: Vec<Cursor<'a>> = terms
            .into_iter()
            .filter_map(|(term, multiplicity)| {
                let mut postings = self.index.get_postings_iterator(&term);
                let current = postings.next()?;
                Some(Cursor { term, multiplicity, postings, current: Some(current) })
            })
            .collect();
        tracing::debug!(query, m, n, active = cursors.len(), "evaluating query");

        let mut sieve = Sieve::new(options.hit_count);
        let mut matched: Vec<usize> = Vec::with_capacity(cursors.len());
        while let Some(document_id) = cursors.iter().filter_map(|c| c.current).map(|p| p.document_id).min() {
            matched.clear();
            matched.extend(
                cursors
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.current.map(|p| p.document_id) == Some(document_id))
                    .map(|(i, _)| i),
            );

            ranker.reset(document_id);
            for &i in &matched {
                let cursor = &cursors[i];
                if let Some(posting) = cursor.current {
                    ranker.update(&cursor.term, cursor.multiplicity, &posting)?;
                }
            }
            let score = ranker.evaluate()?;
            let coverage = matched.len();
            if options.debug {
                tracing::debug!(document_id, coverage, score, qualifies = coverage >= n, "candidate");
            }
            if coverage >= n {
                sieve.sift(score, document_id);
            }

            for &i in &matched {
                let cursor = &mut cursors[i];
                cursor.current = cursor.postings.next();
            }
            cursors.retain(|c| c.current.is_some());
        }

        for (score, document_id) in sieve.winners() {
            let document = self
                .corpus
                .get_document(document_id)
                .ok_or(Error::UnknownDocument(document_id))?;
            callback(Hit { score, document });
        }
        Ok(())
    }

    /// [`SearchEngine::evaluate`], collecting the hits.
    pub fn search(&self, query: &str, options: &SearchOptions, ranker: &mut dyn Ranker) -> Result<Vec<Hit<'a>>, Error> {
        let mut hits = Vec::new();
        self.evaluate(query, options, ranker, |hit| hits.push(hit))?;
        Ok(hits)
    }

    /// Documents containing every distinct query term, ascending.
    pub fn conjunction(&self, query: &str) -> Vec<DocId> {
        let terms = self.query_terms(query);
        let mut lists = terms.iter().map(|(t, _)| self.index.get_postings_iterator(t));
        let Some(first) = lists.next() else {
            return Vec::new();
        };
        let first: Box<dyn Iterator<Item = Posting> + 'a> = Box::new(first);
        let merged = lists.fold(first, |acc, next| -> Box<dyn Iterator<Item = Posting> + 'a> {
            Box::new(PostingsMerger::intersection(acc, next))
        });
        merged.map(|p| p.document_id).collect()
    }

    /// Documents containing any query term, ascending.
    pub fn disjunction(&self, query: &str) -> Vec<DocId> {
        let terms = self.query_terms(query);
        let empty: Box<dyn Iterator<Item = Posting> + 'a> = Box::new(std::iter::empty());
        let merged = terms
            .iter()
            .map(|(t, _)| self.index.get_postings_iterator(t))
            .fold(empty, |acc, next| -> Box<dyn Iterator<Item = Posting> + 'a> {
                Box::new(PostingsMerger::union(acc, next))
            });
        merged.map(|p| p.document_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_matches_is_clamped() {
        assert_eq!(SearchOptions::new(0.5, None).required_matches(2), 1);
        assert_eq!(SearchOptions::new(1.0, None).required_matches(3), 3);
        assert_eq!(SearchOptions::new(0.01, None).required_matches(3), 1);
        assert_eq!(SearchOptions::new(0.66, None).required_matches(3), 1);
        assert_eq!(SearchOptions::new(0.67, None).required_matches(3), 2);
    }

    #[test]
    fn invalid_options_are_rejected() {
        for threshold in [0.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                SearchOptions::new(threshold, None).validate(),
                Err(Error::InvalidMatchThreshold(_))
            ));
        }
        assert_eq!(SearchOptions::new(1.0, Some(0)).validate(), Err(Error::InvalidHitCount));
        assert!(SearchOptions::new(1.0, Some(1)).validate().is_ok());
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: SearchOptions = serde_json::from_str(r#"{"hit_count": 3}"#).unwrap();
        assert_eq!(options, SearchOptions::new(1.0, Some(3)));
    }
}
