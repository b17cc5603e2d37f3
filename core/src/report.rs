use crate::metrics::RetrievalMetrics;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDoc {
    pub doc_id: String,
    pub score: f64,
}

/// One entry of the evaluation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    pub id: String,
    pub query: String,
    pub relevant_docs: Vec<String>,
    pub retrieved_docs: Vec<RetrievedDoc>,
    pub metrics: RetrievalMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub top_k: usize,
    pub num_queries: usize,
    pub avg_hit_at_k: f64,
    pub avg_recall_at_k: f64,
    pub avg_mrr: f64,
    pub generated_at: String,
}

impl Summary {
    pub fn new(top_k: usize, num_queries: usize, averages: RetrievalMetrics) -> Self {
        Self {
            top_k,
            num_queries,
            avg_hit_at_k: averages.hit_at_k,
            avg_recall_at_k: averages.recall_at_k,
            avg_mrr: averages.mrr,
            generated_at: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "".into()),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "=== RAG retrieval evaluation summary ===\n\
             top_k = {}\n\
             avg hit@k   = {:.3}\n\
             avg recall@k= {:.3}\n\
             avg MRR     = {:.3}\n",
            self.top_k, self.avg_hit_at_k, self.avg_recall_at_k, self.avg_mrr
        )
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, value)?;
    w.write_all(b"\n")?;
    w.flush()?;
    Ok(())
}

/// Write the per-query records as a pretty-printed JSON array.
pub fn save_report<P: AsRef<Path>>(path: P, records: &[QueryRecord]) -> Result<()> {
    write_json(path.as_ref(), records)
}

pub fn save_summary<P: AsRef<Path>>(path: P, summary: &Summary) -> Result<()> {
    write_json(path.as_ref(), summary)
}

pub fn load_report<P: AsRef<Path>>(path: P) -> Result<Vec<QueryRecord>> {
    let path = path.as_ref();
    let buf = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let records = serde_json::from_str(&buf)?;
    Ok(records)
}
