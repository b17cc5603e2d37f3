use anyhow::Result;
use clap::{Parser, Subcommand};
use retrieval_core::corpus::load_corpus_dir;
use retrieval_core::eval::{load_queries, run_evaluation};
use retrieval_core::report::{save_report, save_summary};
use retrieval_core::{Bm25Params, CorpusIndex, Retriever};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "evaluator")]
#[command(about = "Evaluate BM25 retrieval quality against labeled queries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a corpus directory and score every query in the queries file
    Run {
        /// Directory of .txt documents; the file name is the document id
        #[arg(long)]
        corpus: PathBuf,
        /// JSON array of {id, query, relevant_docs}
        #[arg(long)]
        queries: PathBuf,
        /// Number of documents retrieved per query
        #[arg(long, default_value_t = 3)]
        top_k: usize,
        /// BM25 term-frequency saturation
        #[arg(long, default_value_t = 1.5)]
        k1: f64,
        /// BM25 length normalization
        #[arg(long, default_value_t = 0.75)]
        b: f64,
        /// Per-query results output path
        #[arg(long, default_value = "retrieval_eval_results.json")]
        output: PathBuf,
        /// Also write the aggregate summary as JSON
        #[arg(long)]
        summary: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { corpus, queries, top_k, k1, b, output, summary } => {
            run(&corpus, &queries, top_k, Bm25Params::new(k1, b)?, &output, summary.as_deref())
        }
    }
}

fn run(corpus: &Path, queries: &Path, top_k: usize, params: Bm25Params, output: &Path, summary_path: Option<&Path>) -> Result<()> {
    let docs = load_corpus_dir(corpus)?;
    let queries = load_queries(queries)?;
    let retriever = Retriever::new(Arc::new(CorpusIndex::build(docs)), params);

    let run = run_evaluation(&retriever, &queries, top_k);
    print!("{}", run.summary.render());

    save_report(output, &run.records)?;
    if let Some(path) = summary_path {
        save_summary(path, &run.summary)?;
        tracing::info!(path = %path.display(), "summary written");
    }
    println!("\nDetailed results saved to: {}", output.display());
    tracing::info!(output = %output.display(), num_queries = run.records.len(), "evaluation report written");
    Ok(())
}
