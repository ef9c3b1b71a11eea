//! Rank-aware retrieval quality metrics.
//!
//! Every function takes a ranked list (best first) and the set of relevant document
//! ids for the query, and returns a value in `[0, 1]`. Empty lists and empty
//! relevance sets are valid inputs.

use crate::DocId;
use std::collections::HashSet;

/// Documents judged relevant for one query.
pub type RelevanceSet = HashSet<DocId>;

fn hits_in_top_k(ranked: &[(DocId, f64)], relevant: &RelevanceSet, k: usize) -> usize {
    ranked.iter().take(k).filter(|(doc_id, _)| relevant.contains(doc_id)).count()
}

/// `|top-k ∩ relevant| / k`. A short list still divides by `k`; `k = 0` yields 0.
pub fn precision_at_k(ranked: &[(DocId, f64)], relevant: &RelevanceSet, k: usize) -> f64 {
    hits_in_top_k(ranked, relevant, k) as f64 / k.max(1) as f64
}

/// `|top-k ∩ relevant| / |relevant|`, 0 when nothing is relevant.
pub fn recall_at_k(ranked: &[(DocId, f64)], relevant: &RelevanceSet, k: usize) -> f64 {
    hits_in_top_k(ranked, relevant, k) as f64 / relevant.len().max(1) as f64
}

/// Mean of the precision values at each relevant hit, over all relevant documents.
/// Relevant documents missing from the list count as zero.
pub fn average_precision(ranked: &[(DocId, f64)], relevant: &RelevanceSet) -> f64 {
    let mut hits = 0usize;
    let mut sum_prec = 0.0f64;
    for (i, (doc_id, _)) in ranked.iter().enumerate() {
        if relevant.contains(doc_id) {
            hits += 1;
            sum_prec += hits as f64 / (i + 1) as f64;
        }
    }
    sum_prec / relevant.len().max(1) as f64
}

/// `1 / rank` of the first relevant document, 0 if there is none.
pub fn reciprocal_rank(ranked: &[(DocId, f64)], relevant: &RelevanceSet) -> f64 {
    ranked
        .iter()
        .position(|(doc_id, _)| relevant.contains(doc_id))
        .map(|i| 1.0 / (i + 1) as f64)
        .unwrap_or(0.0)
}

/// Arithmetic mean, 0 for an empty slice. Used for MAP / MRR over a query set.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(ids: &[DocId]) -> RelevanceSet {
        ids.iter().copied().collect()
    }

    #[test]
    fn perfect_ranking() {
        let ranked = vec![(1, 0.9), (2, 0.8)];
        let r = rel(&[1, 2]);
        assert_eq!(precision_at_k(&ranked, &r, 2), 1.0);
        assert_eq!(recall_at_k(&ranked, &r, 2), 1.0);
        assert_eq!(average_precision(&ranked, &r), 1.0);
        assert_eq!(reciprocal_rank(&ranked, &r), 1.0);
    }

    #[test]
    fn short_list_keeps_k_denominator() {
        let ranked = vec![(1, 0.9)];
        assert_eq!(precision_at_k(&ranked, &rel(&[1]), 5), 0.2);
    }

    #[test]
    fn missing_relevant_docs_lower_ap() {
        let ranked = vec![(1, 0.9), (3, 0.1)];
        assert_eq!(average_precision(&ranked, &rel(&[1, 2])), 0.5);
    }

    #[test]
    fn empty_inputs() {
        let empty: Vec<(DocId, f64)> = Vec::new();
        assert_eq!(precision_at_k(&empty, &rel(&[1]), 10), 0.0);
        assert_eq!(recall_at_k(&[(1, 1.0)], &rel(&[]), 10), 0.0);
        assert_eq!(average_precision(&empty, &rel(&[])), 0.0);
        assert_eq!(reciprocal_rank(&empty, &rel(&[1])), 0.0);
        assert_eq!(precision_at_k(&[(1, 1.0)], &rel(&[1]), 0), 0.0);
    }

    #[test]
    fn mean_of_values() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[0.5, 1.0, 0.0]), 0.5);
    }
}
