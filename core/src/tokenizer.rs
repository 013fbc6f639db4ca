use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\w+").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could",
            "did","do","does","doing","down","during",
            "each","few","for","from","further",
            "had","has","have","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","it","its","itself",
            "me","more","most","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","should","so","some","such",
            "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","very",
            "was","we","were","what","when","where","which","while","who","whom","why","with","would",
            "you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token.to_lowercase().as_str())
}

/// Splits text into tokens.
pub trait Tokenizer: Send + Sync {
    /// Half-open byte ranges of the tokens in `text`, in order.
    fn ranges(&self, text: &str) -> Vec<(usize, usize)>;

    /// The token strings of `text`, in order.
    fn strings<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.ranges(text)
            .into_iter()
            .map(|(start, end)| &text[start..end])
            .collect()
    }
}

/// Unicode word tokenizer with optional English stopword removal.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleTokenizer {
    drop_stopwords: bool,
}

impl SimpleTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stopwords() -> Self {
        Self { drop_stopwords: true }
    }
}

impl Tokenizer for SimpleTokenizer {
    fn ranges(&self, text: &str) -> Vec<(usize, usize)> {
        RE.find_iter(text)
            .filter(|m| !(self.drop_stopwords && is_stopword(m.as_str())))
            .map(|m| (m.start(), m.end()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_are_byte_offsets() {
        let text = "ørret, abba!";
        let ranges = SimpleTokenizer::new().ranges(text);
        assert_eq!(ranges, vec![(0, 6), (8, 12)]);
        assert_eq!(&text[ranges[0].0..ranges[0].1], "ørret");
    }

    #[test]
    fn stopwords_are_optional() {
        let text = "The cat and the hat";
        assert_eq!(SimpleTokenizer::new().strings(text).len(), 5);
        assert_eq!(SimpleTokenizer::with_stopwords().strings(text), vec!["cat", "hat"]);
    }

    #[test]
    fn numbers_are_tokens_and_apostrophes_split() {
        let text = "Top 10 in 2024, don't";
        assert_eq!(SimpleTokenizer::new().strings(text), vec!["Top", "10", "in", "2024", "don", "t"]);
    }
}
