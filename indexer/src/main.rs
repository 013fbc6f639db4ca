use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use searchcore::{
    Analyzer, Corpus, InMemoryCorpus, InvertedIndex, NaiveBayesClassifier, PhraseOptions, RankerKind, SearchEngine,
    SearchOptions, StringFinder, SuffixArray, Trie,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build an in-memory index over a JSON/JSONL corpus and query it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CorpusArgs {
    /// Input path (file or directory of .json/.jsonl files)
    #[arg(long)]
    input: String,
    /// Document fields to index, comma separated
    #[arg(long, value_delimiter = ',', default_value = "title,body")]
    fields: Vec<String>,
    /// Stem terms and drop English stopwords
    #[arg(long, default_value_t = false)]
    stemming: bool,
}

impl CorpusArgs {
    fn analyzer(&self) -> Analyzer {
        if self.stemming { Analyzer::english() } else { Analyzer::simple() }
    }

    fn load(&self) -> Result<(InMemoryCorpus, InvertedIndex)> {
        let corpus = InMemoryCorpus::load(&self.input)?;
        let index = InvertedIndex::build(&corpus, &self.fields, self.analyzer())?;
        Ok((corpus, index))
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum BooleanOp {
    And,
    Or,
}

#[derive(Subcommand)]
enum Commands {
    /// Print document and vocabulary statistics
    Stats {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Number of most frequent terms to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Ranked N-out-of-M retrieval
    Search {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[arg(long)]
        query: String,
        /// Fraction of distinct query terms a document must contain
        #[arg(long, default_value_t = 1.0)]
        threshold: f64,
        #[arg(long)]
        hit_count: Option<usize>,
        /// brain-dead or tf-idf
        #[arg(long, default_value = "tf-idf")]
        ranker: RankerKind,
        #[arg(long, default_value_t = false)]
        debug: bool,
    },
    /// Exact boolean retrieval over the query terms
    Boolean {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[arg(long)]
        query: String,
        #[arg(long, value_enum, default_value_t = BooleanOp::And)]
        op: BooleanOp,
    },
    /// Phrase-prefix search with a suffix array
    Phrase {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[arg(long)]
        query: String,
        #[arg(long)]
        hit_count: Option<usize>,
    },
    /// Find dictionary entries (one per line) in a text
    Find {
        #[arg(long)]
        dictionary: String,
        #[arg(long)]
        text: String,
        #[arg(long, default_value_t = false)]
        stemming: bool,
    },
    /// Naive Bayes classification
    Classify {
        /// Training data as category=path, repeatable
        #[arg(long = "train", required = true)]
        training: Vec<String>,
        #[arg(long, value_delimiter = ',', default_value = "title,body")]
        fields: Vec<String>,
        #[arg(long)]
        text: String,
        #[arg(long, default_value_t = false)]
        stemming: bool,
    },
}

#[derive(Serialize)]
struct HitLine<'a> {
    doc_id: u32,
    score: f64,
    title: Option<&'a str>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats { corpus, top } => stats(&corpus, top),
        Commands::Search { corpus, query, threshold, hit_count, ranker, debug } => {
            let options = SearchOptions { match_threshold: threshold, hit_count, debug };
            search(&corpus, &query, &options, ranker)
        }
        Commands::Boolean { corpus, query, op } => boolean(&corpus, &query, op),
        Commands::Phrase { corpus, query, hit_count } => phrase(&corpus, &query, hit_count),
        Commands::Find { dictionary, text, stemming } => find(&dictionary, &text, stemming),
        Commands::Classify { training, fields, text, stemming } => classify(&training, &fields, &text, stemming),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn stats(args: &CorpusArgs, top: usize) -> Result<()> {
    let (corpus, index) = args.load()?;
    let mut frequencies: Vec<(&str, usize)> = index
        .dictionary()
        .iter()
        .map(|(term, _)| (term, index.get_document_frequency(term)))
        .collect();
    frequencies.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    frequencies.truncate(top);
    print_json(&serde_json::json!({
        "num_docs": corpus.size(),
        "num_terms": index.dictionary().size(),
        "top_terms": frequencies,
    }))
}

fn search(args: &CorpusArgs, query: &str, options: &SearchOptions, kind: RankerKind) -> Result<()> {
    let (corpus, index) = args.load()?;
    let engine = SearchEngine::new(&corpus, &index);
    let mut ranker = kind.build(&corpus, &index);
    let mut lines = Vec::new();
    engine.evaluate(query, options, ranker.as_mut(), |hit| {
        lines.push(HitLine {
            doc_id: hit.document.document_id(),
            score: hit.score,
            title: hit.document.text("title"),
        })
    })?;
    tracing::info!(query, hits = lines.len(), "search complete");
    for line in &lines {
        print_json(line)?;
    }
    Ok(())
}

fn boolean(args: &CorpusArgs, query: &str, op: BooleanOp) -> Result<()> {
    let (corpus, index) = args.load()?;
    let engine = SearchEngine::new(&corpus, &index);
    let doc_ids = match op {
        BooleanOp::And => engine.conjunction(query),
        BooleanOp::Or => engine.disjunction(query),
    };
    print_json(&doc_ids)
}

fn phrase(args: &CorpusArgs, query: &str, hit_count: Option<usize>) -> Result<()> {
    let corpus = InMemoryCorpus::load(&args.input)?;
    let suffix_array = SuffixArray::build(&corpus, &args.fields, args.analyzer());
    let mut lines = Vec::new();
    suffix_array.evaluate(&corpus, query, &PhraseOptions { hit_count }, |hit| {
        lines.push(HitLine {
            doc_id: hit.document.document_id(),
            score: hit.score,
            title: hit.document.text("title"),
        })
    })?;
    for line in &lines {
        print_json(line)?;
    }
    Ok(())
}

fn find(dictionary: &str, text: &str, stemming: bool) -> Result<()> {
    let analyzer = if stemming { Analyzer::english() } else { Analyzer::simple() };
    let entries = fs::read_to_string(dictionary).with_context(|| format!("reading {dictionary}"))?;
    let mut trie = Trie::new();
    for line in entries.lines() {
        trie.add(line, &analyzer);
    }
    let finder = StringFinder::new(&trie, analyzer);
    let mut matches = Vec::new();
    finder.scan(text, |m| matches.push(m));
    for m in matches {
        print_json(&serde_json::json!({
            "match": m.matched,
            "range": [m.range.0, m.range.1],
            "surface": &text[m.range.0..m.range.1],
        }))?;
    }
    Ok(())
}

fn classify(training: &[String], fields: &[String], text: &str, stemming: bool) -> Result<()> {
    let mut training_set: BTreeMap<String, InMemoryCorpus> = BTreeMap::new();
    for entry in training {
        let (category, path) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("--train expects category=path, got {entry:?}"))?;
        training_set.insert(category.to_owned(), InMemoryCorpus::load(path)?);
    }
    let analyzer = if stemming { Analyzer::english() } else { Analyzer::simple() };
    let classifier = NaiveBayesClassifier::train(&training_set, fields, analyzer)?;
    let mut lines = Vec::new();
    classifier.classify(text, |c| lines.push(serde_json::json!({ "category": c.category, "score": c.score })));
    for line in &lines {
        print_json(line)?;
    }
    Ok(())
}
