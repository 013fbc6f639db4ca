use crate::DocId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A document field: free text or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    /// Numbers as-is, text only if it parses as a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    document_id: DocId,
    fields: BTreeMap<String, FieldValue>,
}

impl Document {
    pub fn new(document_id: DocId, fields: BTreeMap<String, FieldValue>) -> Self {
        Self { document_id, fields }
    }

    pub fn document_id(&self) -> DocId {
        self.document_id
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_number)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> + '_ {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Read-only document store addressed by ordinal id.
pub trait Corpus: Send + Sync {
    fn size(&self) -> usize;

    fn get_document(&self, document_id: DocId) -> Option<&Document>;

    /// All documents in a stable order.
    fn documents(&self) -> Box<dyn Iterator<Item = &Document> + '_>;
}

/// Corpus held in a `Vec`; document ids are positions, assigned on insert.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCorpus {
    documents: Vec<Document>,
}

impl InMemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document<K, V, I>(&mut self, fields: I) -> DocId
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let document_id = self.documents.len() as DocId;
        let fields = fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.documents.push(Document::new(document_id, fields));
        document_id
    }

    /// Load a `.json` file (object or array of objects), a `.jsonl` file, or
    /// every such file below a directory in path order.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut files: Vec<PathBuf> = Vec::new();
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
                let p = entry.path();
                if p.is_file() {
                    if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                        if matches!(ext, "json" | "jsonl") {
                            files.push(p.to_path_buf());
                        }
                    }
                }
            }
        } else if path.is_file() {
            files.push(path.to_path_buf());
        } else {
            anyhow::bail!("corpus path {} does not exist", path.display());
        }

        let mut corpus = Self::new();
        for file in files {
            if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
                corpus.load_jsonl(&file)?;
            } else {
                corpus.load_json(&file)?;
            }
        }
        tracing::info!(path = %path.display(), num_docs = corpus.size(), "loaded corpus");
        Ok(corpus)
    }

    fn load_jsonl(&mut self, file: &Path) -> Result<()> {
        let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
        let reader = BufReader::new(f);
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: Map<String, Value> = serde_json::from_str(&line)
                .with_context(|| format!("{}:{}", file.display(), lineno + 1))?;
            self.add_record(record);
        }
        Ok(())
    }

    fn load_json(&mut self, file: &Path) -> Result<()> {
        let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
        let reader = BufReader::new(f);
        let json: Value = serde_json::from_reader(reader)
            .with_context(|| format!("parsing {}", file.display()))?;
        match json {
            Value::Array(arr) => {
                for v in arr {
                    if let Value::Object(record) = v {
                        self.add_record(record);
                    }
                }
            }
            Value::Object(record) => {
                self.add_record(record);
            }
            _ => tracing::warn!(file = %file.display(), "skipping JSON file without objects"),
        }
        Ok(())
    }

    fn add_record(&mut self, record: Map<String, Value>) -> DocId {
        let fields = record.into_iter().filter_map(|(k, v)| match v {
            Value::String(s) => Some((k, FieldValue::Text(s))),
            Value::Number(n) => n.as_f64().map(|n| (k, FieldValue::Number(n))),
            _ => None,
        });
        self.add_document(fields)
    }
}

impl Corpus for InMemoryCorpus {
    fn size(&self) -> usize {
        self.documents.len()
    }

    fn get_document(&self, document_id: DocId) -> Option<&Document> {
        self.documents.get(document_id as usize)
    }

    fn documents(&self) -> Box<dyn Iterator<Item = &Document> + '_> {
        Box::new(self.documents.iter())
    }
}
