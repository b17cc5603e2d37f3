use crate::index::{CorpusIndex, Document};
use crate::scorer::{Bm25Params, Bm25Scorer};
use crate::tokenizer::tokenize;
use std::sync::Arc;

/// Exhaustive BM25 ranking over a shared, read-only [`CorpusIndex`].
#[derive(Debug, Clone)]
pub struct Retriever {
    index: Arc<CorpusIndex>,
    scorer: Bm25Scorer,
}

impl Retriever {
    pub fn new(index: Arc<CorpusIndex>, params: Bm25Params) -> Self {
        Self { index, scorer: Bm25Scorer::new(params) }
    }

    pub fn index(&self) -> &CorpusIndex { &self.index }

    /// Score every document in corpus order.
    pub fn score_all(&self, query: &str) -> Vec<(&Document, f64)> {
        let terms = tokenize(query);
        self.index
            .docs()
            .iter()
            .map(|d| (&d.doc, self.scorer.score(&terms, d, &self.index)))
            .collect()
    }

    /// Every document by descending score. Equal scores keep corpus order
    /// (the sort is stable).
    pub fn rank(&self, query: &str) -> Vec<(&Document, f64)> {
        let mut scored = self.score_all(query);
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored
    }

    /// The first `top_k` entries of [`Retriever::rank`].
    pub fn retrieve(&self, query: &str, top_k: usize) -> Vec<(&Document, f64)> {
        if top_k == 0 {
            return Vec::new();
        }
        let mut ranked = self.rank(query);
        ranked.truncate(top_k);
        ranked
    }
}
