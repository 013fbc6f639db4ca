use lazy_static::lazy_static;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Turns raw text into its canonical form and tokens into terms.
///
/// Indexed text and queries must go through the same normalizer, otherwise
/// nothing matches.
pub trait Normalizer: Send + Sync {
    /// Structural cleanup applied to a whole buffer before tokenization.
    fn canonicalize(&self, text: &str) -> String;

    /// Per-token normalization applied after tokenization.
    fn normalize(&self, token: &str) -> String;
}

/// NFKC folding plus lowercasing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleNormalizer;

impl Normalizer for SimpleNormalizer {
    fn canonicalize(&self, text: &str) -> String {
        text.nfkc().collect()
    }

    fn normalize(&self, token: &str) -> String {
        token.to_lowercase()
    }
}

/// [`SimpleNormalizer`] followed by English Snowball stemming.
#[derive(Debug, Default, Clone, Copy)]
pub struct StemmingNormalizer;

impl Normalizer for StemmingNormalizer {
    fn canonicalize(&self, text: &str) -> String {
        SimpleNormalizer.canonicalize(text)
    }

    fn normalize(&self, token: &str) -> String {
        let lowered = SimpleNormalizer.normalize(token);
        STEMMER.stem(&lowered).into_owned()
    }
}
