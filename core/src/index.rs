use crate::error::IndexError;
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type DocId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(alias = "id")]
    pub doc_id: DocId,
    #[serde(default)]
    pub title: String,
    #[serde(alias = "body", default)]
    pub text: String,
}

impl Document {
    pub fn new(doc_id: DocId, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self { doc_id, title: title.into(), text: text.into() }
    }
}

/// Term -> (document -> raw term frequency). Only non-zero frequencies are stored.
pub type Postings = HashMap<DocId, u32>;

/// Inverted index and collection statistics over a fixed set of documents.
///
/// Built once with [`CorpusIndex::build`] and read-only afterwards, so a single
/// instance can be shared across threads and scorers.
#[derive(Debug, Default, Clone)]
pub struct CorpusIndex {
    num_docs: u32,
    doc_lengths: HashMap<DocId, u32>,
    df: HashMap<String, u32>,
    postings: HashMap<String, Postings>,
    avgdl: f64,
}

impl CorpusIndex {
    /// Index `title + " " + text` of every document.
    ///
    /// Fails on the first repeated document id; nothing is overwritten.
    pub fn build(docs: &[Document]) -> Result<Self, IndexError> {
        let mut index = CorpusIndex::default();
        let mut total_len: u64 = 0;

        for doc in docs {
            if index.doc_lengths.contains_key(&doc.doc_id) {
                return Err(IndexError::DuplicateDocumentId { doc_id: doc.doc_id });
            }
            let tokens = tokenize(&format!("{} {}", doc.title, doc.text));
            let len = tokens.len() as u32;
            index.doc_lengths.insert(doc.doc_id, len);
            total_len += len as u64;

            let mut tf_counts: HashMap<String, u32> = HashMap::new();
            for term in tokens {
                *tf_counts.entry(term).or_insert(0) += 1;
            }
            for (term, tf) in tf_counts {
                *index.df.entry(term.clone()).or_insert(0) += 1;
                index.postings.entry(term).or_default().insert(doc.doc_id, tf);
            }
        }

        index.num_docs = index.doc_lengths.len() as u32;
        index.avgdl = if index.num_docs > 0 { total_len as f64 / index.num_docs as f64 } else { 0.0 };

        tracing::info!(num_docs = index.num_docs, num_terms = index.df.len(), avgdl = index.avgdl, "built corpus index");
        Ok(index)
    }

    pub fn document_count(&self) -> u32 { self.num_docs }

    pub fn average_document_length(&self) -> f64 { self.avgdl }

    /// Token count of a document, `None` if it was not indexed.
    pub fn document_length(&self, doc_id: DocId) -> Option<u32> {
        self.doc_lengths.get(&doc_id).copied()
    }

    pub fn contains_document(&self, doc_id: DocId) -> bool {
        self.doc_lengths.contains_key(&doc_id)
    }

    pub fn doc_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.doc_lengths.keys().copied()
    }

    /// Number of documents containing `term`; 0 for unseen terms.
    pub fn document_frequency(&self, term: &str) -> u32 {
        self.df.get(term).copied().unwrap_or(0)
    }

    pub fn postings(&self, term: &str) -> Option<&Postings> {
        self.postings.get(term)
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.postings.keys().map(String::as_str)
    }

    pub fn vocabulary_size(&self) -> usize { self.postings.len() }

    /// BM25 idf: `ln((N - df + 0.5) / (df + 0.5) + 1)`.
    /// Goes negative only when df is close to N.
    pub fn idf_smooth(&self, term: &str) -> f64 {
        let n = self.num_docs as f64;
        let df = self.document_frequency(term) as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    /// Laplace-smoothed idf used by the vector-space model: `ln((N + 1) / (df + 1))`.
    pub fn idf_plain(&self, term: &str) -> f64 {
        let n = self.num_docs as f64;
        let df = self.document_frequency(term) as f64;
        ((n + 1.0) / (df + 1.0)).ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs() -> Vec<Document> {
        vec![
            Document::new(1, "", "cat dog"),
            Document::new(2, "", "cat cat bird"),
            Document::new(3, "", "bird fish"),
        ]
    }

    #[test]
    fn collection_statistics() {
        let idx = CorpusIndex::build(&docs()).unwrap();
        assert_eq!(idx.document_count(), 3);
        assert_eq!(idx.document_length(2), Some(3));
        assert!((idx.average_document_length() - 7.0 / 3.0).abs() < 1e-12);
        assert_eq!(idx.document_frequency("cat"), 2);
        assert_eq!(idx.document_frequency("bird"), 2);
        assert_eq!(idx.document_frequency("zebra"), 0);
        assert_eq!(idx.postings("cat").unwrap().get(&2), Some(&2));
        assert_eq!(idx.postings("cat").unwrap().get(&3), None);
    }

    #[test]
    fn title_counts_towards_length() {
        let idx = CorpusIndex::build(&[Document::new(7, "Web Search", "ranking")]).unwrap();
        assert_eq!(idx.document_length(7), Some(3));
        assert_eq!(idx.document_frequency("web"), 1);
    }

    #[test]
    fn empty_collection_is_valid() {
        let idx = CorpusIndex::build(&[]).unwrap();
        assert_eq!(idx.document_count(), 0);
        assert_eq!(idx.average_document_length(), 0.0);
        assert_eq!(idx.vocabulary_size(), 0);
        // ln((0 + 1) / (0 + 1))
        assert_eq!(idx.idf_plain("anything"), 0.0);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut d = docs();
        d.push(Document::new(2, "again", "cat"));
        let err = CorpusIndex::build(&d).unwrap_err();
        assert_eq!(err, IndexError::DuplicateDocumentId { doc_id: 2 });
    }

    #[test]
    fn idf_values() {
        let idx = CorpusIndex::build(&docs()).unwrap();
        let expected_smooth = ((3.0 - 2.0 + 0.5) / (2.0 + 0.5) + 1.0f64).ln();
        assert!((idx.idf_smooth("cat") - expected_smooth).abs() < 1e-12);
        let expected_plain = (4.0f64 / 3.0).ln();
        assert!((idx.idf_plain("cat") - expected_plain).abs() < 1e-12);
        // unseen terms get the maximum idf
        assert!(idx.idf_plain("zebra") > idx.idf_plain("fish"));
    }
}
