pub mod corpus;
pub mod eval;
pub mod index;
pub mod metrics;
pub mod report;
pub mod retriever;
pub mod scorer;
pub mod tokenizer;

pub use index::*;
pub use metrics::{evaluate_single_query, RetrievalMetrics};
pub use retriever::Retriever;
pub use scorer::{Bm25Params, Bm25Scorer};
