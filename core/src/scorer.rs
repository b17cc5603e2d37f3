//! BM25 scoring of a single document against a tokenized query.

use crate::index::{CorpusIndex, IndexedDoc};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// BM25 tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f64,
    /// Length-normalization strength, 0 disables it.
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

impl Bm25Params {
    pub fn new(k1: f64, b: f64) -> Result<Self> {
        let params = Self { k1, b };
        params.validate()?;
        Ok(params)
    }

    /// `k1` must be finite and non-negative and `b` within `[0, 1]`; outside
    /// that range the length-normalized denominator can reach zero.
    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            bail!("invalid BM25 k1 {}: must be finite and >= 0", self.k1);
        }
        if !(0.0..=1.0).contains(&self.b) {
            bail!("invalid BM25 b {}: must be within [0, 1]", self.b);
        }
        Ok(())
    }
}

/// `ln((N - df + 0.5) / (df + 0.5) + 1)`; the `+ 1` keeps it non-negative
/// even for a term present in every document.
pub fn idf(num_docs: usize, df: usize) -> f64 {
    let n = num_docs as f64;
    let df = df as f64;
    ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Bm25Scorer {
    params: Bm25Params,
}

impl Bm25Scorer {
    pub fn new(params: Bm25Params) -> Self { Self { params } }

    /// Sum of BM25 contributions of `query_terms` found in `doc`. A query
    /// term repeated in the query contributes once per repetition.
    pub fn score(&self, query_terms: &[String], doc: &IndexedDoc, index: &CorpusIndex) -> f64 {
        if index.is_empty() || doc.length == 0 {
            return 0.0;
        }
        let Bm25Params { k1, b } = self.params;
        let avgdl = if index.avg_doc_length() > 0.0 { index.avg_doc_length() } else { 1.0 };
        let norm = k1 * (1.0 - b + b * doc.length as f64 / avgdl);

        let mut score = 0.0;
        for term in query_terms {
            let Some(&freq) = doc.term_freqs.get(term) else { continue };
            let df = index.document_frequency(term);
            if df == 0 {
                continue;
            }
            let freq = freq as f64;
            score += idf(index.document_count(), df) * freq * (k1 + 1.0) / (freq + norm);
        }
        score
    }
}
