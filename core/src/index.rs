use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Position of a document in corpus order.
pub type DocId = usize;
pub type TermFreqs = HashMap<String, usize>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

/// A document plus the statistics computed for it at build time.
#[derive(Debug, Clone)]
pub struct IndexedDoc {
    pub doc: Document,
    /// Token count.
    pub length: usize,
    /// term -> occurrences in this document
    pub term_freqs: TermFreqs,
}

/// Corpus statistics for BM25. Built once by [`CorpusIndex::build`] and
/// read-only afterwards; share it behind an `Arc` rather than rebuilding.
///
/// Ranking scans every document, there are no postings lists. A term-keyed
/// postings map would be the place to add candidate pruning for larger corpora.
#[derive(Debug, Default)]
pub struct CorpusIndex {
    docs: Vec<IndexedDoc>,
    doc_ids: HashMap<String, DocId>,
    df: HashMap<String, usize>,
    avg_doc_length: f64,
}

impl CorpusIndex {
    pub fn build<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = Document>,
    {
        let mut docs = Vec::new();
        let mut doc_ids: HashMap<String, DocId> = HashMap::new();
        let mut df: HashMap<String, usize> = HashMap::new();
        let mut total_len: usize = 0;

        for doc in documents {
            let tokens = tokenize(&doc.text);
            let length = tokens.len();
            total_len += length;

            let mut term_freqs = TermFreqs::new();
            for term in tokens {
                *term_freqs.entry(term).or_insert(0) += 1;
            }
            // each distinct term counts once per document
            for term in term_freqs.keys() {
                *df.entry(term.clone()).or_insert(0) += 1;
            }

            let doc_id: DocId = docs.len();
            doc_ids.entry(doc.id.clone()).or_insert(doc_id);
            docs.push(IndexedDoc { doc, length, term_freqs });
        }

        let avg_doc_length = if docs.is_empty() { 0.0 } else { total_len as f64 / docs.len() as f64 };
        tracing::info!(num_docs = docs.len(), num_terms = df.len(), avg_doc_length, "built corpus index");

        Self { docs, doc_ids, df, avg_doc_length }
    }

    pub fn document_count(&self) -> usize { self.docs.len() }

    /// Mean token count per document, `0.0` for an empty corpus.
    pub fn avg_doc_length(&self) -> f64 { self.avg_doc_length }

    /// Number of documents containing `term` at least once.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.df.get(term).copied().unwrap_or(0)
    }

    pub fn num_terms(&self) -> usize { self.df.len() }

    pub fn docs(&self) -> &[IndexedDoc] { &self.docs }

    /// Looks a document up by its external id. With duplicate ids the first
    /// document in corpus order wins.
    pub fn get(&self, id: &str) -> Option<&IndexedDoc> {
        self.doc_ids.get(id).map(|&i| &self.docs[i])
    }

    pub fn doc_length(&self, id: &str) -> Option<usize> {
        self.get(id).map(|d| d.length)
    }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> CorpusIndex {
        CorpusIndex::build(vec![
            Document::new("a.txt", "rust rust rust systems"),
            Document::new("b.txt", "Rust, python."),
            Document::new("c.txt", ""),
        ])
    }

    #[test]
    fn df_counts_documents_not_occurrences() {
        let idx = corpus();
        assert_eq!(idx.document_frequency("rust"), 2);
        assert_eq!(idx.document_frequency("python"), 1);
        assert_eq!(idx.document_frequency("java"), 0);
    }

    #[test]
    fn lengths_and_average() {
        let idx = corpus();
        assert_eq!(idx.document_count(), 3);
        assert_eq!(idx.doc_length("a.txt"), Some(4));
        assert_eq!(idx.doc_length("b.txt"), Some(2));
        assert_eq!(idx.doc_length("c.txt"), Some(0));
        assert!((idx.avg_doc_length() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn term_freqs_are_cached() {
        let idx = corpus();
        let a = idx.get("a.txt").unwrap();
        assert_eq!(a.term_freqs.get("rust"), Some(&3));
        assert_eq!(a.term_freqs.get("systems"), Some(&1));
    }

    #[test]
    fn long_documents_keep_exact_counts() {
        let n = 300_000;
        let idx = CorpusIndex::build(vec![
            Document::new("long", "word ".repeat(n)),
            Document::new("short", "word"),
        ]);
        assert_eq!(idx.doc_length("long"), Some(n));
        assert_eq!(idx.get("long").unwrap().term_freqs.get("word"), Some(&n));
        assert_eq!(idx.document_frequency("word"), 2);
        assert!((idx.avg_doc_length() - (n + 1) as f64 / 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_corpus_is_defined() {
        let idx = CorpusIndex::build(Vec::new());
        assert!(idx.is_empty());
        assert_eq!(idx.avg_doc_length(), 0.0);
        assert_eq!(idx.num_terms(), 0);
    }
}
