use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use filingdb_answer::{build_index, Engine};
use filingdb_core::config::{resolve_with_base, Config, EngineConfig};

mod eval;

#[derive(Parser, Debug)]
#[command(name = "filingdb", version, about = "Question answering over financial filings with abstention")]
struct Cli {
    /// Extra TOML file layered over config.toml and the environment.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Chunk and index every .txt filing under a directory.
    Ingest {
        /// Defaults to paths.filings_dir.
        dir: Option<PathBuf>,
        #[arg(long)]
        index: Option<PathBuf>,
    },
    /// Answer a question from the indexed filings.
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
        #[arg(long)]
        index: Option<PathBuf>,
        /// Print the full response as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show what the current index holds.
    Stats {
        #[arg(long)]
        index: Option<PathBuf>,
    },
    /// Score answers against a JSONL test set.
    Eval {
        testset: PathBuf,
        #[arg(long)]
        index: Option<PathBuf>,
        #[arg(long, default_value_t = 0.5)]
        min_accuracy: f64,
        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_config(extra: Option<&Path>) -> Result<EngineConfig> {
    let mut config = Config::load().context("loading configuration")?;
    if let Some(path) = extra {
        if !path.exists() {
            bail!("config file {} does not exist", path.display());
        }
        config = config.with_file(path);
    }
    Ok(config.engine()?)
}

fn index_path(cwd: &Path, flag: Option<PathBuf>, config: &EngineConfig) -> PathBuf {
    flag.unwrap_or_else(|| resolve_with_base(cwd, &config.paths.index_path))
}

fn open_engine(path: &Path, config: EngineConfig) -> Result<Engine> {
    Engine::open(path, config)
        .with_context(|| format!("opening index {} (run `filingdb ingest` first)", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(cli.config.as_deref())?;
    let cwd = std::env::current_dir().context("resolving working directory")?;

    match cli.command {
        Commands::Ingest { dir, index } => {
            let dir = dir.unwrap_or_else(|| resolve_with_base(&cwd, &config.paths.filings_dir));
            let index = index_path(&cwd, index, &config);
            println!("Ingesting filings from {}", dir.display());
            let report = build_index(&dir, &index, &config)
                .with_context(|| format!("building index from {}", dir.display()))?;
            println!("\n✅ Index written to {}", report.index_path.display());
            println!("📊 {} documents, {} chunks, {} terms", report.documents, report.chunks, report.vocabulary_size);
        }
        Commands::Ask { question, index, json } => {
            let engine = open_engine(&index_path(&cwd, index, &config), config)?;
            let response = engine.answer_question(&question.join(" "));
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else if response.abstained {
                println!("{}", response.answer);
                if let Some(message) = &response.message {
                    println!("({message})");
                }
            } else {
                println!("{}\n", response.answer);
                println!("Confidence: {:.2}", response.confidence);
                for (rank, citation) in response.citations.iter().enumerate() {
                    println!("  [{}] {} #{} (score {:.3})", rank + 1, citation.source, citation.chunk_id, citation.score);
                }
            }
        }
        Commands::Stats { index } => {
            let path = index_path(&cwd, index, &config);
            let engine = if path.exists() { open_engine(&path, config)? } else { Engine::unloaded(config)? };
            let stats = engine.stats();
            println!("Index: {}", path.display());
            println!("  documents:  {}", stats.documents);
            println!("  chunks:     {}", stats.chunks);
            println!("  vocabulary: {}", stats.vocabulary_size);
            println!("  loaded:     {}", stats.index_loaded);
        }
        Commands::Eval { testset, index, min_accuracy, json } => {
            let cases = eval::load_test_cases(&testset)?;
            let engine = open_engine(&index_path(&cwd, index, &config), config)?;
            let report = eval::evaluate(&engine, &cases);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for detail in &report.details {
                    let mark = if detail.correct { "✓" } else { "✗" };
                    let outcome = if detail.abstained { "abstained" } else { "answered" };
                    println!("{mark} [{outcome} {:.2}] {}", detail.confidence, detail.question);
                }
                println!(
                    "\n📊 {} questions: {} answered, {} abstained, {} correct",
                    report.total, report.answered, report.abstained, report.correct
                );
                println!(
                    "   accuracy {:.2}, avg confidence {:.2}, citations on {}",
                    report.accuracy, report.avg_confidence, report.citations_provided
                );
            }
            tracing::info!(accuracy = report.accuracy, min_accuracy, "evaluation finished");
            if report.accuracy < min_accuracy {
                bail!("accuracy {:.2} is below the required {:.2}", report.accuracy, min_accuracy);
            }
        }
    }
    Ok(())
}
