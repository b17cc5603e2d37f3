use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn write_fixture(dir: &std::path::Path) {
    let corpus = dir.join("corpus");
    fs::create_dir_all(&corpus).unwrap();
    fs::write(corpus.join("doc1.txt"), "Rust guarantees memory safety without a garbage collector.").unwrap();
    fs::write(corpus.join("doc2.txt"), "Retrieval augmented generation needs a good retriever.").unwrap();
    fs::write(corpus.join("doc3.txt"), "BM25 scores documents by term frequency and length.").unwrap();
    fs::write(
        dir.join("queries.json"),
        r#"[
            {"id": "q1", "query": "memory safety", "relevant_docs": ["doc1.txt"]},
            {"id": "q2", "query": "term frequency scoring", "relevant_docs": ["doc3.txt"]}
        ]"#,
    )
    .unwrap();
}

#[test]
fn run_writes_report_and_summary() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    let output = dir.path().join("results.json");
    let summary = dir.path().join("summary.json");

    let out = Command::new(env!("CARGO_BIN_EXE_evaluator"))
        .arg("run")
        .arg("--corpus").arg(dir.path().join("corpus"))
        .arg("--queries").arg(dir.path().join("queries.json"))
        .arg("--top-k").arg("2")
        .arg("--output").arg(&output)
        .arg("--summary").arg(&summary)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("top_k = 2"));
    assert!(stdout.contains("avg hit@k   = 1.000"));

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let records = report.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["retrieved_docs"][0]["doc_id"], "doc1.txt");
    assert_eq!(records[1]["retrieved_docs"][0]["doc_id"], "doc3.txt");
    assert!(records[1]["retrieved_docs"].as_array().unwrap().len() <= 2);

    let summary: serde_json::Value = serde_json::from_str(&fs::read_to_string(&summary).unwrap()).unwrap();
    assert_eq!(summary["num_queries"], 2);
    assert_eq!(summary["avg_mrr"], 1.0);
}

#[test]
fn missing_queries_file_fails() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    let out = Command::new(env!("CARGO_BIN_EXE_evaluator"))
        .arg("run")
        .arg("--corpus").arg(dir.path().join("corpus"))
        .arg("--queries").arg(dir.path().join("missing.json"))
        .arg("--output").arg(dir.path().join("results.json"))
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(!dir.path().join("results.json").exists());
}

#[test]
fn invalid_bm25_params_fail_before_writing() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    let out = Command::new(env!("CARGO_BIN_EXE_evaluator"))
        .arg("run")
        .arg("--corpus").arg(dir.path().join("corpus"))
        .arg("--queries").arg(dir.path().join("queries.json"))
        .arg("--k1=-1")
        .arg("--b").arg("0")
        .arg("--output").arg(dir.path().join("results.json"))
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("k1"));
    assert!(!dir.path().join("results.json").exists());
}
