use crate::Document;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Load every `.txt` file directly inside `dir` as a document whose id is the
/// file name. Files are read in file-name order so corpus order is stable.
pub fn load_corpus_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<Document>> {
    let dir = dir.as_ref();
    let mut docs = Vec::new();
    let walker = WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name();
    for entry in walker {
        let entry = entry.with_context(|| format!("reading corpus directory {}", dir.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if path.extension().and_then(|s| s.to_str()) != Some("txt") {
            tracing::debug!(path = %path.display(), "skipping non-text file");
            continue;
        }
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let id = entry.file_name().to_string_lossy().into_owned();
        docs.push(Document { id, text });
    }
    tracing::info!(dir = %dir.display(), num_docs = docs.len(), "loaded corpus");
    Ok(docs)
}
