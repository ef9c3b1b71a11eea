//! Ranking models over a [`CorpusIndex`].
//!
//! Both models implement [`Scorer`]; callers pick one with [`ScoringModel`].

mod bm25;
mod vsm;

pub use bm25::{Bm25, Bm25Params};
pub use vsm::Vsm;

use crate::{CorpusIndex, DocId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// `(doc_id, score)` pairs, best first.
pub type RankedList = Vec<(DocId, f64)>;

/// Rank documents for a free-text query against an index.
pub trait Scorer {
    /// Short model name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Top `k` documents sharing at least one term with `query`.
    /// Never fails; unknown terms and empty queries give an empty list.
    fn score(&self, query: &str, k: usize) -> RankedList;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringModel {
    Vsm,
    Bm25,
}

impl ScoringModel {
    pub const ALL: [ScoringModel; 2] = [ScoringModel::Vsm, ScoringModel::Bm25];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringModel::Vsm => "VSM",
            ScoringModel::Bm25 => "BM25",
        }
    }

    /// Wrap `index` in the scorer for this model. BM25 uses `params`, VSM ignores them.
    pub fn scorer<'a>(&self, index: &'a CorpusIndex, params: Bm25Params) -> Box<dyn Scorer + Send + Sync + 'a> {
        match self {
            ScoringModel::Vsm => Box::new(Vsm::new(index)),
            ScoringModel::Bm25 => Box::new(Bm25::with_params(index, params)),
        }
    }
}

impl fmt::Display for ScoringModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vsm" | "tfidf" | "tf-idf" => Ok(ScoringModel::Vsm),
            "bm25" => Ok(ScoringModel::Bm25),
            other => Err(format!("unknown scoring model {other:?}, expected vsm or bm25")),
        }
    }
}

/// Sort accumulated scores descending and keep the first `k`.
/// Equal scores are ordered by ascending doc id.
pub(crate) fn top_k(scores: HashMap<DocId, f64>, k: usize) -> RankedList {
    let mut scored: RankedList = scores.into_iter().collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scored.truncate(k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_k_breaks_ties_by_doc_id() {
        let scores: HashMap<DocId, f64> = [(9, 1.0), (3, 1.0), (5, 2.0), (1, 0.5)].into_iter().collect();
        let ranked = top_k(scores, 3);
        assert_eq!(ranked, vec![(5, 2.0), (3, 1.0), (9, 1.0)]);
    }

    #[test]
    fn top_k_zero() {
        let scores: HashMap<DocId, f64> = [(1, 1.0)].into_iter().collect();
        assert!(top_k(scores, 0).is_empty());
    }

    #[test]
    fn parse_model_names() {
        assert_eq!("BM25".parse::<ScoringModel>(), Ok(ScoringModel::Bm25));
        assert_eq!("vsm".parse::<ScoringModel>(), Ok(ScoringModel::Vsm));
        assert!("lsi".parse::<ScoringModel>().is_err());
    }
}
