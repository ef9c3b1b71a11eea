//! Loading of documents, queries and relevance judgments from JSON files.

use crate::metrics::RelevanceSet;
use crate::{DocId, Document};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub qid: String,
    pub query: String,
}

#[derive(Deserialize)]
struct RawQuery {
    #[serde(alias = "query_id")]
    qid: serde_json::Value,
    #[serde(alias = "text")]
    query: String,
}

/// Relevance judgments keyed by query id.
#[derive(Debug, Clone, Default)]
pub struct Qrels {
    judgments: HashMap<String, RelevanceSet>,
}

impl Qrels {
    pub fn new(judgments: HashMap<String, RelevanceSet>) -> Self {
        Self { judgments }
    }

    /// Relevant documents for `qid`; empty for queries without judgments.
    pub fn relevant(&self, qid: &str) -> RelevanceSet {
        self.judgments.get(qid).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize { self.judgments.len() }

    pub fn is_empty(&self) -> bool { self.judgments.is_empty() }
}

/// Load documents from a `.json` file (array or single object), a `.jsonl` file,
/// or a directory containing either.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let mut files: Vec<PathBuf> = Vec::new();
    if path.is_dir() {
        for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if path.is_file() {
        files.push(path.to_path_buf());
    } else {
        bail!("corpus path {} does not exist", path.display());
    }

    let mut docs = Vec::new();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
    }
    tracing::info!(path = %path.display(), num_docs = docs.len(), "loaded corpus");
    Ok(docs)
}

fn read_jsonl(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: Document = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid document", file.display(), lineno + 1))?;
        docs.push(doc);
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parsing {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                docs.push(serde_json::from_value(v).with_context(|| format!("{}: invalid document", file.display()))?);
            }
        }
        serde_json::Value::Object(_) => {
            docs.push(serde_json::from_value(json).with_context(|| format!("{}: invalid document", file.display()))?);
        }
        _ => bail!("{}: expected a document or an array of documents", file.display()),
    }
    Ok(())
}

/// Load a JSON array of `{"qid": .., "query": ..}` records.
pub fn load_queries<P: AsRef<Path>>(path: P) -> Result<Vec<Query>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let raw: Vec<RawQuery> = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parsing queries from {}", path.display()))?;
    let queries = raw
        .into_iter()
        .map(|q| -> Result<Query> { Ok(Query { qid: qid_to_string(q.qid)?, query: q.query }) })
        .collect::<Result<Vec<_>>>()?;
    tracing::info!(path = %path.display(), num_queries = queries.len(), "loaded queries");
    Ok(queries)
}

/// Load a JSON object mapping query ids to arrays of relevant document ids.
pub fn load_qrels<P: AsRef<Path>>(path: P) -> Result<Qrels> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let raw: HashMap<String, Vec<DocId>> = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parsing qrels from {}", path.display()))?;
    let judgments = raw.into_iter().map(|(qid, ids)| (qid, ids.into_iter().collect())).collect();
    Ok(Qrels::new(judgments))
}

fn qid_to_string(v: serde_json::Value) -> Result<String> {
    match v {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => bail!("query id must be a string or number, got {other}"),
    }
}
