//! Per-query evaluation of both ranking models and the aggregate summary.

use retrieval_core::dataset::{Qrels, Query};
use retrieval_core::metrics::{average_precision, mean, precision_at_k, recall_at_k, reciprocal_rank};
use retrieval_core::{Bm25Params, CorpusIndex, ScoringModel};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub k_values: Vec<usize>,
    /// How many results each model returns per query before metrics are taken.
    pub depth: usize,
    pub bm25: Bm25Params,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self { k_values: vec![5, 10], depth: 50, bm25: Bm25Params::default() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelMetrics {
    pub precision: BTreeMap<usize, f64>,
    pub recall: BTreeMap<usize, f64>,
    pub average_precision: f64,
    pub reciprocal_rank: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryRow {
    pub qid: String,
    pub query: String,
    pub num_relevant: usize,
    pub models: BTreeMap<ScoringModel, ModelMetrics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub model: ScoringModel,
    pub map: f64,
    pub mrr: f64,
    pub mean_precision: BTreeMap<usize, f64>,
    pub mean_recall: BTreeMap<usize, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    pub num_docs: u32,
    pub k_values: Vec<usize>,
    pub depth: usize,
    pub bm25: Bm25Params,
    pub queries: Vec<QueryRow>,
    pub summary: Vec<ModelSummary>,
}

/// Rank every query with VSM and BM25 over the same index and score the rankings.
pub fn evaluate(index: &CorpusIndex, queries: &[Query], qrels: &Qrels, config: &EvalConfig) -> EvalReport {
    let scorers: Vec<_> = ScoringModel::ALL.iter().map(|m| (*m, m.scorer(index, config.bm25))).collect();

    let mut rows = Vec::with_capacity(queries.len());
    for q in queries {
        let relevant = qrels.relevant(&q.qid);
        let mut models = BTreeMap::new();
        for (model, scorer) in &scorers {
            let ranked = scorer.score(&q.query, config.depth);
            let metrics = ModelMetrics {
                precision: config.k_values.iter().map(|&k| (k, precision_at_k(&ranked, &relevant, k))).collect(),
                recall: config.k_values.iter().map(|&k| (k, recall_at_k(&ranked, &relevant, k))).collect(),
                average_precision: average_precision(&ranked, &relevant),
                reciprocal_rank: reciprocal_rank(&ranked, &relevant),
            };
            models.insert(*model, metrics);
        }
        tracing::debug!(qid = %q.qid, num_relevant = relevant.len(), "evaluated query");
        rows.push(QueryRow { qid: q.qid.clone(), query: q.query.clone(), num_relevant: relevant.len(), models });
    }

    let summary = ScoringModel::ALL.iter().map(|m| summarize(*m, &rows, &config.k_values)).collect();
    EvalReport {
        generated_at: None,
        num_docs: index.document_count(),
        k_values: config.k_values.clone(),
        depth: config.depth,
        bm25: config.bm25,
        queries: rows,
        summary,
    }
}

fn summarize(model: ScoringModel, rows: &[QueryRow], k_values: &[usize]) -> ModelSummary {
    let per_model: Vec<&ModelMetrics> = rows.iter().filter_map(|r| r.models.get(&model)).collect();
    let avg = |f: &dyn Fn(&ModelMetrics) -> f64| mean(&per_model.iter().map(|&m| f(m)).collect::<Vec<_>>());
    ModelSummary {
        model,
        map: avg(&|m| m.average_precision),
        mrr: avg(&|m| m.reciprocal_rank),
        mean_precision: k_values.iter().map(|&k| (k, avg(&|m| m.precision[&k]))).collect(),
        mean_recall: k_values.iter().map(|&k| (k, avg(&|m| m.recall[&k]))).collect(),
    }
}

/// Plain-text per-query table followed by the summary lines.
pub fn render_table(report: &EvalReport) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:<6} {:<40}", "qid", "query");
    for model in ScoringModel::ALL {
        for k in &report.k_values {
            let _ = write!(out, " {:>9} {:>9}", format!("{model}_P@{k}"), format!("{model}_R@{k}"));
        }
        let _ = write!(out, " {:>9} {:>9}", format!("{model}_AP"), format!("{model}_RR"));
    }
    out.push('\n');

    for row in &report.queries {
        let query: String = row.query.chars().take(40).collect();
        let _ = write!(out, "{:<6} {:<40}", row.qid, query);
        for model in ScoringModel::ALL {
            let Some(m) = row.models.get(&model) else { continue };
            for k in &report.k_values {
                let _ = write!(out, " {:>9.3} {:>9.3}", m.precision[k], m.recall[k]);
            }
            let _ = write!(out, " {:>9.3} {:>9.3}", m.average_precision, m.reciprocal_rank);
        }
        out.push('\n');
    }

    out.push_str("\n=== Evaluation Summary ===\n");
    for s in &report.summary {
        let _ = write!(out, "{} - MAP: {:.3} | MRR: {:.3}", s.model, s.map, s.mrr);
        for k in &report.k_values {
            let _ = write!(out, " | P@{k}: {:.3} | R@{k}: {:.3}", s.mean_precision[k], s.mean_recall[k]);
        }
        out.push('\n');
    }
    out
}
