//! Phrase-prefix search over a suffix array of normalized document text.

use crate::analyzer::Analyzer;
use crate::corpus::Corpus;
use crate::error::Error;
use crate::search::Hit;
use crate::sieve::Sieve;
use crate::DocId;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PhraseOptions {
    #[serde(default)]
    pub hit_count: Option<usize>,
}

/// Sorted token-start suffixes of each document's normalized text.
///
/// A query phrase must start on a token boundary but may stop mid-token,
/// so "to the be" finds "to the best" and "to the bearnaise".
#[derive(Debug)]
pub struct SuffixArray {
    analyzer: Analyzer,
    haystacks: Vec<(DocId, String)>,
    suffixes: Vec<(u32, u32)>, // (haystack index, byte offset)
}

impl SuffixArray {
    pub fn build<S: AsRef<str>>(corpus: &dyn Corpus, fields: &[S], analyzer: Analyzer) -> Self {
        let mut haystacks = Vec::with_capacity(corpus.size());
        let mut suffixes = Vec::new();
        for doc in corpus.documents() {
            let text = fields
                .iter()
                .filter_map(|f| doc.text(f.as_ref()))
                .map(|t| analyzer.phrase(t))
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if text.is_empty() {
                continue;
            }
            let slot = haystacks.len() as u32;
            suffixes.push((slot, 0));
            suffixes.extend(text.match_indices(' ').map(|(i, _)| (slot, i as u32 + 1)));
            haystacks.push((doc.document_id(), text));
        }
        suffixes.sort_unstable_by(|a, b| suffix_of(&haystacks, *a).cmp(suffix_of(&haystacks, *b)));
        tracing::info!(documents = haystacks.len(), suffixes = suffixes.len(), "built suffix array");
        Self { analyzer, haystacks, suffixes }
    }

    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    fn suffix(&self, entry: (u32, u32)) -> &str {
        suffix_of(&self.haystacks, entry)
    }

    /// Occurrence counts per document of suffixes starting with `pattern`.
    fn count_matches(&self, pattern: &str) -> HashMap<DocId, u32> {
        let lo = self.suffixes.partition_point(|&s| self.suffix(s) < pattern);
        let hi = lo + self.suffixes[lo..].partition_point(|&s| self.suffix(s).starts_with(pattern));
        let mut counts: HashMap<DocId, u32> = HashMap::new();
        for &(slot, _) in &self.suffixes[lo..hi] {
            *counts.entry(self.haystacks[slot as usize].0).or_insert(0) += 1;
        }
        counts
    }

    /// Report documents containing the normalized `query` as a phrase
    /// prefix, ranked by number of occurrences.
    pub fn evaluate<'c, F>(
        &self,
        corpus: &'c dyn Corpus,
        query: &str,
        options: &PhraseOptions,
        mut callback: F,
    ) -> Result<(), Error>
    where
        F: FnMut(Hit<'c>),
    {
        if options.hit_count == Some(0) {
            return Err(Error::InvalidHitCount);
        }
        let pattern = self.analyzer.phrase(query);
        if pattern.is_empty() {
            return Ok(());
        }
        let mut sieve = Sieve::new(options.hit_count);
        for (document_id, count) in self.count_matches(&pattern) {
            sieve.sift(f64::from(count), document_id);
        }
        for (score, document_id) in sieve.winners() {
            let document = corpus.get_document(document_id).ok_or(Error::UnknownDocument(document_id))?;
            callback(Hit { score, document });
        }
        Ok(())
    }
}

fn suffix_of(haystacks: &[(DocId, String)], (slot, offset): (u32, u32)) -> &str {
    &haystacks[slot as usize].1[offset as usize..]
}
