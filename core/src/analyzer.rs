use crate::normalization::{Normalizer, SimpleNormalizer, StemmingNormalizer};
use crate::tokenizer::{SimpleTokenizer, Tokenizer};
use std::fmt;
use std::sync::Arc;
use unicode_normalization::char::canonical_combining_class;

/// The text-to-terms pipeline shared by indexing and querying.
///
/// Cloning is cheap; clones share the same normalizer and tokenizer.
#[derive(Clone)]
pub struct Analyzer {
    normalizer: Arc<dyn Normalizer>,
    tokenizer: Arc<dyn Tokenizer>,
}

impl Analyzer {
    pub fn new(normalizer: impl Normalizer + 'static, tokenizer: impl Tokenizer + 'static) -> Self {
        Self { normalizer: Arc::new(normalizer), tokenizer: Arc::new(tokenizer) }
    }

    /// NFKC + lowercase, every word kept.
    pub fn simple() -> Self {
        Self::new(SimpleNormalizer, SimpleTokenizer::new())
    }

    /// NFKC + lowercase + English stemming, stopwords dropped.
    pub fn english() -> Self {
        Self::new(StemmingNormalizer, SimpleTokenizer::with_stopwords())
    }

    pub fn normalizer(&self) -> &dyn Normalizer {
        self.normalizer.as_ref()
    }

    pub fn tokenizer(&self) -> &dyn Tokenizer {
        self.tokenizer.as_ref()
    }

    /// Canonicalize, tokenize and normalize `text`.
    pub fn terms(&self, text: &str) -> Vec<String> {
        let canonical = self.normalizer.canonicalize(text);
        self.tokenizer
            .strings(&canonical)
            .into_iter()
            .map(|token| self.normalizer.normalize(token))
            .collect()
    }

    /// Like [`Analyzer::terms`], but each term carries the half-open byte
    /// range in `text` it was derived from.
    ///
    /// `text` is canonicalized one base character (with its combining marks)
    /// at a time, so offsets in the canonical text map back to `text`. A token
    /// that starts or ends inside an expansion covers the whole source character.
    pub fn terms_with_ranges(&self, text: &str) -> Vec<(String, (usize, usize))> {
        // (canonical offset, raw offset) of every chunk start
        let mut offsets: Vec<(usize, usize)> = Vec::new();
        let mut canonical = String::with_capacity(text.len());
        let mut chunk_start = 0;
        for (i, c) in text.char_indices().skip(1) {
            if canonical_combining_class(c) == 0 {
                offsets.push((canonical.len(), chunk_start));
                canonical.push_str(&self.normalizer.canonicalize(&text[chunk_start..i]));
                chunk_start = i;
            }
        }
        if !text.is_empty() {
            offsets.push((canonical.len(), chunk_start));
            canonical.push_str(&self.normalizer.canonicalize(&text[chunk_start..]));
        }

        self.tokenizer
            .ranges(&canonical)
            .into_iter()
            .map(|(start, end)| {
                let first = offsets.partition_point(|&(c, _)| c <= start).saturating_sub(1);
                let raw_start = offsets.get(first).map_or(0, |&(_, r)| r);
                let raw_end = offsets
                    .get(offsets.partition_point(|&(c, _)| c < end))
                    .map_or(text.len(), |&(_, r)| r);
                (self.normalizer.normalize(&canonical[start..end]), (raw_start, raw_end))
            })
            .collect()
    }

    /// Normalize a single raw token as if it had gone through [`Analyzer::terms`].
    pub fn normalize_token(&self, token: &str) -> String {
        self.normalizer.normalize(&self.normalizer.canonicalize(token))
    }

    /// The terms of `text` joined by single spaces.
    pub fn phrase(&self, text: &str) -> String {
        self.terms(text).join(" ")
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::simple()
    }
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_are_normalized() {
        let terms = Analyzer::simple().terms("The  Cat, sat!");
        assert_eq!(terms, vec!["the", "cat", "sat"]);
    }

    #[test]
    fn phrase_collapses_whitespace_and_punctuation() {
        assert_eq!(Analyzer::simple().phrase("  To the\tBE... "), "to the be");
    }

    #[test]
    fn ranges_point_into_the_raw_text() {
        let text = "ﬁsh  x² cafe\u{301}!";
        let terms = Analyzer::simple().terms_with_ranges(text);
        let found: Vec<_> = terms.iter().map(|(t, (s, e))| (t.as_str(), &text[*s..*e])).collect();
        assert_eq!(found, vec![("fish", "ﬁsh"), ("x2", "x²"), ("café", "cafe\u{301}")]);
        let plain: Vec<_> = terms.into_iter().map(|(t, _)| t).collect();
        assert_eq!(plain, Analyzer::simple().terms(text));
    }

    #[test]
    fn normalize_token_matches_terms() {
        let analyzer = Analyzer::english();
        assert_eq!(analyzer.normalize_token("Running"), "run");
        assert_eq!(Analyzer::simple().normalize_token("ﬁSH"), "fish");
    }

    #[test]
    fn english_stems_and_drops_stopwords() {
        let terms = Analyzer::english().terms("The runners were running");
        assert_eq!(terms, vec!["runner", "run"]);
    }
}
