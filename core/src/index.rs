use crate::analyzer::Analyzer;
use crate::corpus::Corpus;
use crate::dictionary::Dictionary;
use crate::error::Error;
use crate::{DocId, TermId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One (document, term frequency) record in a term's posting list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub document_id: DocId,
    pub term_frequency: u32,
}

/// Lazy ascending walk over one posting list.
pub type PostingsIter<'a> = std::iter::Copied<std::slice::Iter<'a, Posting>>;

const NO_POSTINGS: &[Posting] = &[];

/// Non-positional in-memory inverted index.
///
/// Every posting list is sorted by document id with no duplicates. The
/// index is built once and read-only afterwards, so it can be shared by
/// concurrent queries.
#[derive(Debug)]
pub struct InvertedIndex {
    analyzer: Analyzer,
    dictionary: Dictionary,
    postings: Vec<Vec<Posting>>, // indexed by term id
}

impl InvertedIndex {
    /// Index the named fields of every document in `corpus`.
    ///
    /// Postings are appended in corpus iteration order. A list only gets
    /// sorted if the corpus handed out a lower document id after a higher one.
    pub fn build<S: AsRef<str>>(corpus: &dyn Corpus, fields: &[S], analyzer: Analyzer) -> Result<Self, Error> {
        let mut dictionary = Dictionary::new();
        let mut postings: Vec<Vec<Posting>> = Vec::new();
        let mut unsorted: Vec<TermId> = Vec::new();

        for doc in corpus.documents() {
            let document_id = doc.document_id();
            let mut counts: HashMap<TermId, u32> = HashMap::new();
            for field in fields {
                let Some(text) = doc.text(field.as_ref()) else { continue };
                for term in analyzer.terms(text) {
                    let term_id = dictionary.add_if_absent(&term)?;
                    if term_id as usize == postings.len() {
                        postings.push(Vec::new());
                    }
                    *counts.entry(term_id).or_insert(0) += 1;
                }
            }

            for (term_id, term_frequency) in counts {
                let list = &mut postings[term_id as usize];
                match list.last_mut() {
                    Some(last) if last.document_id == document_id => last.term_frequency += term_frequency,
                    Some(last) if last.document_id > document_id => {
                        if unsorted.last() != Some(&term_id) {
                            unsorted.push(term_id);
                        }
                        list.push(Posting { document_id, term_frequency });
                    }
                    _ => list.push(Posting { document_id, term_frequency }),
                }
            }
        }

        unsorted.sort_unstable();
        unsorted.dedup();
        for term_id in &unsorted {
            sort_and_coalesce(&mut postings[*term_id as usize]);
        }

        tracing::info!(
            num_docs = corpus.size(),
            num_terms = dictionary.size(),
            resorted = unsorted.len(),
            "built inverted index"
        );
        Ok(Self { analyzer, dictionary, postings })
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Run `text` through the same pipeline the documents went through.
    pub fn get_terms(&self, text: &str) -> Vec<String> {
        self.analyzer.terms(text)
    }

    /// Postings for `term` in ascending document order; empty if unknown.
    pub fn get_postings_iterator(&self, term: &str) -> PostingsIter<'_> {
        self.postings_for(term).iter().copied()
    }

    pub fn get_document_frequency(&self, term: &str) -> usize {
        self.postings_for(term).len()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.get_document_frequency(term) > 0
    }

    fn postings_for(&self, term: &str) -> &[Posting] {
        match self.dictionary.get_term_id(term) {
            Some(term_id) => &self.postings[term_id as usize],
            None => NO_POSTINGS,
        }
    }
}

fn sort_and_coalesce(list: &mut Vec<Posting>) {
    list.sort_by_key(|p| p.document_id);
    let mut merged: Vec<Posting> = Vec::with_capacity(list.len());
    for posting in list.drain(..) {
        match merged.last_mut() {
            Some(last) if last.document_id == posting.document_id => {
                last.term_frequency += posting.term_frequency
            }
            _ => merged.push(posting),
        }
    }
    *list = merged;
}
