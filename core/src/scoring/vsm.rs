use super::{top_k, RankedList, Scorer};
use crate::tokenizer::tokenize;
use crate::{CorpusIndex, DocId};
use std::collections::{BTreeMap, HashMap};

/// TF-IDF weighting with cosine similarity.
///
/// Weights are `(1 + ln tf) * idf_plain`. Document norms only cover the terms shared
/// with the query, so the similarity measures how the matching terms are
/// distributed rather than the whole document vector.
#[derive(Debug, Clone, Copy)]
pub struct Vsm<'a> {
    index: &'a CorpusIndex,
}

impl<'a> Vsm<'a> {
    pub fn new(index: &'a CorpusIndex) -> Self {
        Self { index }
    }
}

impl Scorer for Vsm<'_> {
    fn name(&self) -> &'static str { "VSM" }

    fn score(&self, query: &str, k: usize) -> RankedList {
        // BTreeMap keeps the accumulation order fixed between calls.
        let mut tf_q: BTreeMap<String, u32> = BTreeMap::new();
        for term in tokenize(query) {
            *tf_q.entry(term).or_insert(0) += 1;
        }

        let mut numerator: HashMap<DocId, f64> = HashMap::new();
        let mut doc_norm: HashMap<DocId, f64> = HashMap::new();
        let mut q_norm = 0.0f64;

        for (term, qtf) in tf_q.iter() {
            let Some(postings) = self.index.postings(term) else { continue };
            let idf = self.index.idf_plain(term);
            let qw = (1.0 + (*qtf as f64).ln()) * idf;
            q_norm += qw * qw;
            for (doc_id, tf) in postings {
                let dw = (1.0 + (*tf as f64).ln()) * idf;
                *numerator.entry(*doc_id).or_insert(0.0) += qw * dw;
                *doc_norm.entry(*doc_id).or_insert(0.0) += dw * dw;
            }
        }

        let q_norm = if q_norm > 0.0 { q_norm.sqrt() } else { 1.0 };
        let sims: HashMap<DocId, f64> = numerator
            .into_iter()
            .map(|(doc_id, num)| {
                let dn = doc_norm.get(&doc_id).copied().unwrap_or(0.0);
                let sim = if dn > 0.0 { num / (dn.sqrt() * q_norm) } else { 0.0 };
                (doc_id, sim)
            })
            .collect();

        tracing::debug!(query, candidates = sims.len(), "vsm scored query");
        top_k(sims, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    fn index() -> CorpusIndex {
        CorpusIndex::build(&[
            Document::new(1, "", "cat dog"),
            Document::new(2, "", "cat cat bird"),
            Document::new(3, "", "bird fish"),
            Document::new(4, "", "elephant"),
        ])
        .unwrap()
    }

    #[test]
    fn single_term_query_has_unit_similarity() {
        let idx = index();
        let ranked = Vsm::new(&idx).score("cat", 10);
        assert_eq!(ranked.len(), 2);
        for (_, sim) in &ranked {
            assert!((sim - 1.0).abs() < 1e-12);
        }
        // equal similarity falls back to doc id order
        assert_eq!(ranked[0].0, 1);
        assert_eq!(ranked[1].0, 2);
    }

    #[test]
    fn full_overlap_beats_partial_overlap() {
        let idx = index();
        let ranked = Vsm::new(&idx).score("bird fish", 10);
        assert_eq!(ranked[0].0, 3);
        assert!(ranked[0].1 > ranked[1].1);
        assert!(ranked.iter().all(|(_, s)| *s <= 1.0 + 1e-12));
    }

    #[test]
    fn unknown_and_empty_queries() {
        let idx = index();
        let vsm = Vsm::new(&idx);
        assert!(vsm.score("zebra", 10).is_empty());
        assert!(vsm.score("", 10).is_empty());
        assert!(vsm.score("...", 10).is_empty());
    }

    #[test]
    fn term_in_every_document_gives_zero_similarity() {
        // idf_plain = ln(3/3) = 0, so every weight is zero but the doc is still a candidate
        let idx = CorpusIndex::build(&[Document::new(1, "", "rust"), Document::new(2, "", "rust go")]).unwrap();
        let ranked = Vsm::new(&idx).score("rust", 10);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|(_, s)| *s == 0.0));
    }
}
