use super::{top_k, RankedList, Scorer};
use crate::tokenizer::tokenize;
use crate::{CorpusIndex, DocId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Okapi BM25 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    /// Term frequency saturation.
    pub k1: f64,
    /// Length normalization strength, 0 disables it.
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

/// Okapi BM25 with the smoothed idf from [`CorpusIndex::idf_smooth`].
///
/// Each query token occurrence contributes on its own, so `"cat cat"` scores
/// exactly twice as high as `"cat"`.
#[derive(Debug, Clone, Copy)]
pub struct Bm25<'a> {
    index: &'a CorpusIndex,
    params: Bm25Params,
}

impl<'a> Bm25<'a> {
    pub fn new(index: &'a CorpusIndex) -> Self {
        Self::with_params(index, Bm25Params::default())
    }

    pub fn with_params(index: &'a CorpusIndex, params: Bm25Params) -> Self {
        Self { index, params }
    }

    pub fn params(&self) -> Bm25Params { self.params }
}

impl Scorer for Bm25<'_> {
    fn name(&self) -> &'static str { "BM25" }

    fn score(&self, query: &str, k: usize) -> RankedList {
        let Bm25Params { k1, b } = self.params;
        let avgdl = self.index.average_document_length();
        let mut scores: HashMap<DocId, f64> = HashMap::new();

        for term in tokenize(query) {
            let Some(postings) = self.index.postings(&term) else { continue };
            let idf = self.index.idf_smooth(&term);
            for (doc_id, tf) in postings {
                let tf = *tf as f64;
                let dl = self.index.document_length(*doc_id).unwrap_or(0) as f64;
                let rel_len = if avgdl > 0.0 { dl / avgdl } else { 0.0 };
                let denom = tf + k1 * (1.0 - b + b * rel_len);
                *scores.entry(*doc_id).or_insert(0.0) += idf * (tf * (k1 + 1.0)) / denom;
            }
        }

        tracing::debug!(query, candidates = scores.len(), k1, b, "bm25 scored query");
        top_k(scores, k)
    }
}
