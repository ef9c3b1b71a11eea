//! Ad-hoc text retrieval: an in-memory inverted index, VSM and BM25 ranking,
//! and the standard IR metrics used to compare them.

pub mod dataset;
pub mod error;
pub mod index;
pub mod metrics;
pub mod scoring;
pub mod tokenizer;

pub use error::IndexError;
pub use index::{CorpusIndex, DocId, Document, Postings};
pub use metrics::RelevanceSet;
pub use scoring::{Bm25, Bm25Params, RankedList, Scorer, ScoringModel, Vsm};
