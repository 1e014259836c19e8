//! CLI entrypoint for tenderag
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tenderag_application::{ProcessTurnInput, ProcessTurnUseCase, TurnRecord, TurnStore};
use tenderag_domain::ConversationHistory;
use tenderag_infrastructure::{
    CatalogToolExecutor, ConfigLoader, InMemoryEvidenceIndex, JsonlTurnStore, NoticeCatalogClient,
    build_gateway,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tenderag", version, about = "Q&A agent over procurement notices")]
struct Cli {
    /// Increase log verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Explicit config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ignore all config files and use built-in defaults
    #[arg(long, global = true)]
    no_config: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask one question and print the reviewed answer
    Ask {
        /// The question to answer
        question: String,

        /// JSONL file of embedded evidence chunks (overrides config)
        #[arg(long)]
        chunks: Option<PathBuf>,

        /// Skip relevance grading of retrieved fragments
        #[arg(long)]
        no_grading: bool,

        /// JSONL file the processed turn is appended to
        #[arg(long, default_value = "tenderag.turns.jsonl")]
        turn_log: PathBuf,

        /// Print the full result as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    for warning in config.validate() {
        warn!("Config: {warning}");
    }

    match cli.command {
        Command::Ask {
            question,
            chunks,
            no_grading,
            turn_log,
            json,
        } => ask(config, question, chunks, no_grading, turn_log, json).await,
    }
}

async fn ask(
    mut config: tenderag_infrastructure::FileConfig,
    question: String,
    chunks: Option<PathBuf>,
    no_grading: bool,
    turn_log: PathBuf,
    json: bool,
) -> Result<()> {
    if let Some(path) = chunks {
        config.retrieval.chunks_file = Some(path.to_string_lossy().into_owned());
    }
    if no_grading {
        config.retrieval.grading_enabled = false;
    }
    let params = config.turn_params();

    // === Dependency Injection ===
    let gateway = build_gateway(&config.provider).context("Failed to build provider gateway")?;

    let index = match &config.retrieval.chunks_file {
        Some(path) => Arc::new(
            InMemoryEvidenceIndex::from_jsonl_file(path)
                .with_context(|| format!("Failed to load evidence chunks from {path}"))?,
        ),
        None => {
            info!("No chunks file configured, starting with an empty evidence index");
            Arc::new(InMemoryEvidenceIndex::empty())
        }
    };

    let catalog = Arc::new(
        NoticeCatalogClient::new(
            &config.retrieval.catalog_url,
            Duration::from_secs(config.provider.timeout_seconds),
        )
        .context("Failed to build catalog client")?,
    );
    let executor = Arc::new(CatalogToolExecutor::new(catalog));

    let use_case = ProcessTurnUseCase::new(gateway, index, executor);
    let history = ConversationHistory::new(params.history_cap);
    let result = use_case
        .execute(ProcessTurnInput::new(question.clone(), history, params))
        .await
        .context("Turn processing failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&question, &result);
    }

    // Persistence is fire-and-forget: a failing store must not fail the run
    match JsonlTurnStore::new(&turn_log) {
        Some(store) => {
            let mut payload = serde_json::to_value(&result)?;
            if let serde_json::Value::Object(map) = &mut payload {
                map.insert(
                    "question".to_string(),
                    serde_json::Value::String(question),
                );
            }
            store.record(TurnRecord::new("turn_completed", payload));
        }
        None => warn!("Turn log unavailable, result not persisted"),
    }

    Ok(())
}

fn print_summary(question: &str, result: &tenderag_domain::AgentResult) {
    println!("Question: {question}");
    println!();
    println!("{}", result.final_answer);
    println!();

    let tracking = &result.review_tracking;
    let review = if tracking.performed {
        format!(
            "{} loop(s) of {}, final score {}",
            tracking.loops_executed, tracking.max_loops, tracking.final_score
        )
    } else {
        "not performed".to_string()
    };
    println!("-- route: {} | review: {}", result.route, review);

    if !result.documents_used.is_empty() {
        println!("-- evidence:");
        for document in &result.documents_used {
            println!("   {} {}", document.id, document.summary);
        }
    }
    if !result.tools_used.is_empty() {
        println!("-- tools: {}", result.tools_used.join(", "));
    }
}
