//! Multinomial naive Bayes text classification.

use crate::analyzer::Analyzer;
use crate::corpus::Corpus;
use crate::dictionary::Dictionary;
use crate::error::Error;
use std::collections::BTreeMap;

/// One category's score for a classified buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification<'a> {
    /// Natural-log posterior, up to a shared constant.
    pub score: f64,
    pub category: &'a str,
}

#[derive(Debug)]
struct Category {
    name: String,
    log_prior: f64,
    /// ln P(term | category), indexed by term id.
    log_likelihoods: Vec<f64>,
}

/// Naive Bayes with add-one smoothing, trained once from labeled corpora.
#[derive(Debug)]
pub struct NaiveBayesClassifier {
    analyzer: Analyzer,
    vocabulary: Dictionary,
    categories: Vec<Category>,
}

impl NaiveBayesClassifier {
    /// Train on the named fields of each category's documents.
    pub fn train<C, S>(training_set: &BTreeMap<String, C>, fields: &[S], analyzer: Analyzer) -> Result<Self, Error>
    where
        C: Corpus,
        S: AsRef<str>,
    {
        let total_docs: usize = training_set.values().map(Corpus::size).sum();
        if total_docs == 0 {
            return Err(Error::EmptyTrainingSet);
        }

        let mut vocabulary = Dictionary::new();
        let mut counts: Vec<(String, usize, Vec<u32>, u64)> = Vec::with_capacity(training_set.len());
        for (name, corpus) in training_set {
            let mut term_counts: Vec<u32> = Vec::new();
            let mut tokens: u64 = 0;
            for doc in corpus.documents() {
                for field in fields {
                    let Some(text) = doc.text(field.as_ref()) else { continue };
                    for term in analyzer.terms(text) {
                        let id = vocabulary.add_if_absent(&term)? as usize;
                        if id >= term_counts.len() {
                            term_counts.resize(id + 1, 0);
                        }
                        term_counts[id] += 1;
                        tokens += 1;
                    }
                }
            }
            counts.push((name.clone(), corpus.size(), term_counts, tokens));
        }

        let vocabulary_size = vocabulary.size();
        let categories = counts
            .into_iter()
            .map(|(name, docs, term_counts, tokens)| {
                let denominator = (tokens + vocabulary_size as u64) as f64;
                let log_likelihoods = (0..vocabulary_size)
                    .map(|id| {
                        let count = term_counts.get(id).copied().unwrap_or(0);
                        ((f64::from(count) + 1.0) / denominator).ln()
                    })
                    .collect();
                Category { name, log_prior: (docs as f64 / total_docs as f64).ln(), log_likelihoods }
            })
            .collect();

        tracing::info!(categories = training_set.len(), vocabulary = vocabulary_size, total_docs, "trained classifier");
        Ok(Self { analyzer, vocabulary, categories })
    }

    pub fn vocabulary(&self) -> &Dictionary {
        &self.vocabulary
    }

    /// Score `buffer` against every category, best first. Terms never seen
    /// in training are ignored.
    pub fn classify<F>(&self, buffer: &str, mut callback: F)
    where
        F: FnMut(Classification<'_>),
    {
        let term_ids: Vec<usize> = self
            .analyzer
            .terms(buffer)
            .iter()
            .filter_map(|t| self.vocabulary.get_term_id(t))
            .map(|id| id as usize)
            .collect();

        let mut scores: Vec<Classification<'_>> = self
            .categories
            .iter()
            .map(|c| Classification {
                score: c.log_prior + term_ids.iter().map(|&id| c.log_likelihoods[id]).sum::<f64>(),
                category: &c.name,
            })
            .collect();
        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        for classification in scores {
            callback(classification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::InMemoryCorpus;

    fn corpus(texts: &[&str]) -> InMemoryCorpus {
        let mut corpus = InMemoryCorpus::new();
        for text in texts {
            corpus.add_document([("body", *text)]);
        }
        corpus
    }

    // Example 13.1 from Manning, Raghavan & Schütze.
    fn china_classifier() -> NaiveBayesClassifier {
        let mut training = BTreeMap::new();
        training.insert(
            "china".to_owned(),
            corpus(&["Chinese Beijing Chinese", "Chinese Chinese Shanghai", "Chinese Macao"]),
        );
        training.insert("not china".to_owned(), corpus(&["Tokyo Japan Chinese"]));
        NaiveBayesClassifier::train(&training, &["body"], Analyzer::simple()).unwrap()
    }

    #[test]
    fn textbook_example() {
        let classifier = china_classifier();
        assert_eq!(classifier.vocabulary().size(), 6);
        let mut results = Vec::new();
        classifier.classify("Chinese Chinese Chinese Tokyo Japan", |c| {
            results.push((c.category.to_owned(), c.score))
        });
        assert_eq!(results[0].0, "china");
        assert_eq!(results[1].0, "not china");
        let expected_china = (0.75f64).ln() + 3.0 * (3.0f64 / 7.0).ln() + 2.0 * (1.0f64 / 14.0).ln();
        let expected_other = (0.25f64).ln() + 3.0 * (2.0f64 / 9.0).ln() + 2.0 * (2.0f64 / 9.0).ln();
        assert!((results[0].1 - expected_china).abs() < 1e-9);
        assert!((results[1].1 - expected_other).abs() < 1e-9);
    }

    #[test]
    fn unknown_terms_fall_back_to_priors() {
        let classifier = china_classifier();
        let mut results = Vec::new();
        classifier.classify("zebra", |c| results.push((c.category.to_owned(), c.score)));
        assert_eq!(results[0], ("china".to_owned(), (0.75f64).ln()));
    }

    #[test]
    fn empty_training_set_is_rejected() {
        let training: BTreeMap<String, InMemoryCorpus> = BTreeMap::new();
        let err = NaiveBayesClassifier::train(&training, &["body"], Analyzer::simple()).unwrap_err();
        assert_eq!(err, Error::EmptyTrainingSet);
    }
}
