//! Dictionary matching over token boundaries.

use crate::analyzer::Analyzer;
use std::collections::BTreeMap;

/// A character trie; every node is itself a trie.
///
/// Multi-word entries are stored with single spaces between their terms.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Trie {
    children: BTreeMap<char, Trie>,
    is_final: bool,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `string` after running it through `analyzer`, so spacing and
    /// punctuation differences do not matter. Strings without terms are ignored.
    pub fn add(&mut self, string: &str, analyzer: &Analyzer) {
        let phrase = analyzer.phrase(string);
        if !phrase.is_empty() {
            self.insert(&phrase);
        }
    }

    /// Insert `string` verbatim.
    pub fn insert(&mut self, string: &str) {
        let mut node = self;
        for c in string.chars() {
            node = node.children.entry(c).or_default();
        }
        node.is_final = true;
    }

    /// The node reached by reading `prefix`, if any entry starts with it.
    pub fn consume(&self, prefix: &str) -> Option<&Trie> {
        prefix.chars().try_fold(self, |node, c| node.children.get(&c))
    }

    /// True if an entry ends at this node.
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The dictionary entry, in normalized form.
    pub matched: String,
    /// Byte range of the match in the scanned buffer.
    pub range: (usize, usize),
}

/// Finds every trie entry occurring in a buffer, starting and ending on
/// token boundaries. Runs in time linear in the buffer, independent of the
/// dictionary size.
pub struct StringFinder<'t> {
    trie: &'t Trie,
    analyzer: Analyzer,
}

struct State<'t> {
    node: &'t Trie,
    start: usize,
    matched: String,
}

impl<'t> StringFinder<'t> {
    /// `analyzer` must be the one the trie was filled with.
    pub fn new(trie: &'t Trie, analyzer: Analyzer) -> Self {
        Self { trie, analyzer }
    }

    pub fn scan<F: FnMut(Match)>(&self, buffer: &str, mut callback: F) {
        let mut live: Vec<State<'t>> = Vec::new();
        for (token, (start, end)) in self.analyzer.terms_with_ranges(buffer) {
            live.push(State { node: self.trie, start, matched: String::new() });

            let mut next = Vec::with_capacity(live.len());
            for mut state in live.drain(..) {
                let node = if state.matched.is_empty() {
                    state.node.consume(&token)
                } else {
                    state.node.consume(" ").and_then(|n| n.consume(&token))
                };
                let Some(node) = node else { continue };
                if !state.matched.is_empty() {
                    state.matched.push(' ');
                }
                state.matched.push_str(&token);
                if node.is_final() {
                    callback(Match { matched: state.matched.clone(), range: (state.start, end) });
                }
                if !node.is_leaf() {
                    next.push(State { node, ..state });
                }
            }
            live = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trie(strings: &[&str]) -> Trie {
        let analyzer = Analyzer::simple();
        let mut trie = Trie::new();
        for s in strings {
            trie.add(s, &analyzer);
        }
        trie
    }

    #[test]
    fn consume_and_final_states() {
        let trie = trie(&["abba", "norsk ørret", "abb", "abbab", "abbor"]);
        assert!(!trie.is_final());
        assert!(trie.consume("snegle").is_none());
        let node = trie.consume("ab").unwrap();
        assert!(!node.is_final());
        let node = node.consume("b").unwrap();
        assert!(node.is_final());
        assert_eq!(Some(node), trie.consume("abb"));
    }

    #[test]
    fn add_normalizes_whitespace() {
        let trie = trie(&["  Norsk,   ØRRET "]);
        assert!(trie.consume("norsk ørret").unwrap().is_final());
    }

    #[test]
    fn scan_reports_matches_on_token_boundaries() {
        let trie = trie(&["romerike", "apple computer", "apple", "camera", "norsk ørret"]);
        let finder = StringFinder::new(&trie, Analyzer::simple());
        let buffer = "Apple  Computer bought a cAmErA in Romerikeville. Norsk ørret!";
        let mut matches = Vec::new();
        finder.scan(buffer, |m| matches.push(m));
        let found: Vec<_> = matches.iter().map(|m| (m.matched.as_str(), &buffer[m.range.0..m.range.1])).collect();
        assert_eq!(found, vec![
            ("apple", "Apple"),
            ("apple computer", "Apple  Computer"),
            ("camera", "cAmErA"),
            ("norsk ørret", "Norsk ørret"),
        ]);
    }

    #[test]
    fn scan_agrees_with_the_analyzer_on_folded_text() {
        let trie = trie(&["x²", "fish market"]);
        let finder = StringFinder::new(&trie, Analyzer::simple());
        let buffer = "x² at the ﬁsh Market";
        let mut matches = Vec::new();
        finder.scan(buffer, |m| matches.push(m));
        let found: Vec<_> = matches.iter().map(|m| (m.matched.as_str(), &buffer[m.range.0..m.range.1])).collect();
        assert_eq!(found, vec![("x2", "x²"), ("fish market", "ﬁsh Market")]);
    }

    #[test]
    fn scan_of_empty_buffer_reports_nothing() {
        let trie = trie(&["a"]);
        let mut called = false;
        StringFinder::new(&trie, Analyzer::simple()).scan("", |_| called = true);
        assert!(!called);
    }
}
