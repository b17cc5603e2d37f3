//! Retrieval quality metrics for a single query.
//!
//! `retrieved` is the ranked list already truncated to the top k; `relevant`
//! is the ground-truth set. Every metric is `0.0` when `relevant` is empty.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalMetrics {
    pub hit_at_k: f64,
    pub recall_at_k: f64,
    pub mrr: f64,
}

impl RetrievalMetrics {
    /// Arithmetic mean across queries; all zeros for no queries.
    pub fn mean<'a, I>(metrics: I) -> Self
    where
        I: IntoIterator<Item = &'a RetrievalMetrics>,
    {
        let mut sum = RetrievalMetrics::default();
        let mut n = 0usize;
        for m in metrics {
            sum.hit_at_k += m.hit_at_k;
            sum.recall_at_k += m.recall_at_k;
            sum.mrr += m.mrr;
            n += 1;
        }
        let n = n.max(1) as f64;
        RetrievalMetrics { hit_at_k: sum.hit_at_k / n, recall_at_k: sum.recall_at_k / n, mrr: sum.mrr / n }
    }
}

pub fn hit_at_k<S: AsRef<str>>(retrieved: &[S], relevant: &HashSet<String>) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    if retrieved.iter().any(|id| relevant.contains(id.as_ref())) { 1.0 } else { 0.0 }
}

/// Counted over distinct relevant ids, so duplicates in `retrieved` cannot
/// push it above 1.
pub fn recall_at_k<S: AsRef<str>>(retrieved: &[S], relevant: &HashSet<String>) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let found: HashSet<&str> = retrieved
        .iter()
        .map(|id| id.as_ref())
        .filter(|id| relevant.contains(*id))
        .collect();
    found.len() as f64 / relevant.len() as f64
}

/// Reciprocal rank of the first relevant id (1-indexed).
pub fn mrr<S: AsRef<str>>(retrieved: &[S], relevant: &HashSet<String>) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    retrieved
        .iter()
        .position(|id| relevant.contains(id.as_ref()))
        .map_or(0.0, |pos| 1.0 / (pos + 1) as f64)
}

pub fn evaluate_single_query<S: AsRef<str>>(retrieved: &[S], relevant: &HashSet<String>) -> RetrievalMetrics {
    RetrievalMetrics {
        hit_at_k: hit_at_k(retrieved, relevant),
        recall_at_k: recall_at_k(retrieved, relevant),
        mrr: mrr(retrieved, relevant),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn hit() {
        assert_eq!(hit_at_k(&["d1", "d2", "d3"], &set(&["d2"])), 1.0);
        assert_eq!(hit_at_k(&["d1", "d3"], &set(&["d2"])), 0.0);
    }

    #[test]
    fn recall() {
        assert_eq!(recall_at_k(&["d1", "d2"], &set(&["d2", "d3"])), 0.5);
        assert_eq!(recall_at_k(&["d2", "d3"], &set(&["d2", "d3"])), 1.0);
        assert_eq!(recall_at_k(&["d2", "d2"], &set(&["d2", "d3"])), 0.5);
    }

    #[test]
    fn reciprocal_rank() {
        let rel = set(&["d2", "d3"]);
        assert_eq!(mrr(&["d2", "d1", "d3"], &rel), 1.0);
        assert_eq!(mrr(&["d1", "d3", "d2"], &rel), 0.5);
        assert_eq!(mrr(&["d1", "d4"], &rel), 0.0);
    }

    #[test]
    fn empty_relevant_is_zero() {
        let m = evaluate_single_query(&["d1", "d2"], &HashSet::new());
        assert_eq!(m, RetrievalMetrics::default());
        let none: [&str; 0] = [];
        assert_eq!(evaluate_single_query(&none, &HashSet::new()), RetrievalMetrics::default());
    }

    #[test]
    fn mean_of_nothing_is_zero() {
        assert_eq!(RetrievalMetrics::mean(std::iter::empty()), RetrievalMetrics::default());
        let avg = RetrievalMetrics::mean(&[
            RetrievalMetrics { hit_at_k: 1.0, recall_at_k: 1.0, mrr: 1.0 },
            RetrievalMetrics { hit_at_k: 0.0, recall_at_k: 0.5, mrr: 0.0 },
        ]);
        assert_eq!(avg, RetrievalMetrics { hit_at_k: 0.5, recall_at_k: 0.75, mrr: 0.5 });
    }
}
