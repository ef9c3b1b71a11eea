mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use report::{evaluate, render_table, EvalConfig};
use retrieval_core::dataset::{load_corpus, load_qrels, load_queries};
use retrieval_core::{Bm25Params, CorpusIndex, DocId, Document, ScoringModel};
use std::collections::HashMap;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "evaluator")]
#[command(about = "Compare VSM and BM25 rankings against relevance judgments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank every query with both models and report P@k, R@k, AP, RR, MAP and MRR
    Eval {
        /// Corpus path (JSON/JSONL file or directory)
        #[arg(long, default_value = "data/corpus.json")]
        corpus: String,
        /// Queries JSON file
        #[arg(long, default_value = "data/queries.json")]
        queries: String,
        /// Relevance judgments JSON file (qid -> [doc_id])
        #[arg(long, default_value = "data/qrels.json")]
        qrels: String,
        /// Cutoffs for P@k and R@k (comma-separated)
        #[arg(long, value_delimiter = ',', default_values_t = vec![5usize, 10])]
        k: Vec<usize>,
        /// Number of results ranked per query
        #[arg(long, default_value_t = 50)]
        depth: usize,
        #[arg(long, default_value_t = 1.5)]
        k1: f64,
        #[arg(long, default_value_t = 0.75)]
        b: f64,
        /// Emit the report as JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run a single query and print the ranked documents
    Search {
        #[arg(long, default_value = "data/corpus.json")]
        corpus: String,
        #[arg(long)]
        query: String,
        #[arg(long, default_value_t = 10)]
        k: usize,
        /// vsm, bm25, or both
        #[arg(long, default_value = "both")]
        model: String,
        #[arg(long, default_value_t = 1.5)]
        k1: f64,
        #[arg(long, default_value_t = 0.75)]
        b: f64,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Eval { corpus, queries, qrels, k, depth, k1, b, json } => {
            let config = EvalConfig { k_values: k, depth, bm25: Bm25Params { k1, b } };
            run_eval(&corpus, &queries, &qrels, &config, json)
        }
        Commands::Search { corpus, query, k, model, k1, b } => {
            run_search(&corpus, &query, k, &model, Bm25Params { k1, b })
        }
    }
}

fn run_eval(corpus: &str, queries: &str, qrels: &str, config: &EvalConfig, json: bool) -> Result<()> {
    let docs = load_corpus(corpus)?;
    let queries = load_queries(queries)?;
    let qrels = load_qrels(qrels)?;
    let index = CorpusIndex::build(&docs).with_context(|| format!("indexing {corpus}"))?;

    let mut report = evaluate(&index, &queries, &qrels, config);
    report.generated_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .ok();
    tracing::info!(num_queries = report.queries.len(), "evaluation complete");

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_table(&report));
    }
    Ok(())
}

fn run_search(corpus: &str, query: &str, k: usize, model: &str, params: Bm25Params) -> Result<()> {
    let models: Vec<ScoringModel> = if model.eq_ignore_ascii_case("both") {
        ScoringModel::ALL.to_vec()
    } else {
        vec![model.parse::<ScoringModel>().map_err(anyhow::Error::msg)?]
    };

    let docs = load_corpus(corpus)?;
    let index = CorpusIndex::build(&docs).with_context(|| format!("indexing {corpus}"))?;
    let by_id: HashMap<DocId, &Document> = docs.iter().map(|d| (d.doc_id, d)).collect();

    for model in models {
        let scorer = model.scorer(&index, params);
        let ranked = scorer.score(query, k);
        println!("== {} results for {query:?}", scorer.name());
        if ranked.is_empty() {
            println!("   (no matching documents)");
        }
        for (rank, (doc_id, score)) in ranked.iter().enumerate() {
            let title = by_id.get(doc_id).map(|d| d.title.as_str()).unwrap_or("");
            println!("#{:<3} {:>6}  {:.4}  {}", rank + 1, doc_id, score, title);
        }
        println!();
    }
    Ok(())
}
