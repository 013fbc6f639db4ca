use searchcore::analyzer::Analyzer;
use searchcore::tokenizer::{SimpleTokenizer, Tokenizer};

#[test]
fn it_normalizes_and_stems() {
    let words = Analyzer::english().terms("Running Runners RUN! The ﬁsh menu.");
    assert!(words.contains(&"run".to_string()));
    // NFKC folds the ligature before tokenizing
    assert!(words.contains(&"fish".to_string()));
}

#[test]
fn it_filters_stopwords() {
    let words = Analyzer::english().terms("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert!(words.contains(&"fox".to_string()));
}

#[test]
fn simple_analyzer_keeps_every_word() {
    let words = Analyzer::simple().terms("The cat sat on the mat");
    assert_eq!(words, vec!["the", "cat", "sat", "on", "the", "mat"]);
}

#[test]
fn ranges_and_strings_agree() {
    let text = "  multi-word, token   boundaries ";
    let tokenizer = SimpleTokenizer::new();
    let from_ranges: Vec<&str> = tokenizer.ranges(text).into_iter().map(|(s, e)| &text[s..e]).collect();
    assert_eq!(from_ranges, tokenizer.strings(text));
    assert_eq!(from_ranges, vec!["multi", "word", "token", "boundaries"]);
}

#[test]
fn queries_and_documents_share_the_pipeline() {
    let analyzer = Analyzer::english();
    assert_eq!(analyzer.terms("Cats"), analyzer.terms("cat"));
}
