use crate::metrics::{evaluate_single_query, RetrievalMetrics};
use crate::report::{QueryRecord, RetrievedDoc, Summary};
use crate::retriever::Retriever;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A labeled query: free text plus the ids of the documents judged relevant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalQuery {
    pub id: String,
    pub query: String,
    #[serde(default)]
    pub relevant_docs: HashSet<String>,
}

/// Load a JSON array of `{id, query, relevant_docs}` objects.
pub fn load_queries<P: AsRef<Path>>(path: P) -> Result<Vec<EvalQuery>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("opening queries file {}", path.display()))?;
    let queries: Vec<EvalQuery> = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parsing queries file {}", path.display()))?;
    Ok(queries)
}

pub struct EvalRun {
    pub records: Vec<QueryRecord>,
    pub summary: Summary,
}

/// Retrieve the top `top_k` documents for every query and score them against
/// its relevance judgments.
pub fn run_evaluation(retriever: &Retriever, queries: &[EvalQuery], top_k: usize) -> EvalRun {
    let mut records = Vec::with_capacity(queries.len());
    for q in queries {
        let retrieved = retriever.retrieve(&q.query, top_k);
        let retrieved_ids: Vec<&str> = retrieved.iter().map(|(d, _)| d.id.as_str()).collect();
        let metrics = evaluate_single_query(&retrieved_ids, &q.relevant_docs);
        tracing::debug!(query_id = %q.id, hit = metrics.hit_at_k, recall = metrics.recall_at_k, mrr = metrics.mrr, "evaluated query");

        let mut relevant_docs: Vec<String> = q.relevant_docs.iter().cloned().collect();
        relevant_docs.sort();
        records.push(QueryRecord {
            id: q.id.clone(),
            query: q.query.clone(),
            relevant_docs,
            retrieved_docs: retrieved
                .iter()
                .map(|(d, score)| RetrievedDoc { doc_id: d.id.clone(), score: *score })
                .collect(),
            metrics,
        });
    }

    let averages = RetrievalMetrics::mean(records.iter().map(|r| &r.metrics));
    let summary = Summary::new(top_k, records.len(), averages);
    tracing::info!(num_queries = summary.num_queries, avg_mrr = summary.avg_mrr, "evaluation complete");
    EvalRun { records, summary }
}
