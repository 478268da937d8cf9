//! One-shot question about an event from the command line
//!
//! Run with: cargo run -p event-rag --features cli --bin event-rag-ask -- --event <id> --question "..."

use anyhow::Context;
use clap::Parser;
use event_rag::{config::RagConfig, QueryPipeline};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "event-rag-ask")]
#[command(about = "Answer a question about a disaster event with cited sources")]
struct Args {
    /// Event identifier (corpus file name without `.json`)
    #[arg(long, short)]
    event: String,

    /// Question to answer
    #[arg(long, short)]
    question: String,

    /// TOML config file (defaults to $EVENT_RAG_CONFIG, then built-in defaults)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Number of sources handed to the generator
    #[arg(long)]
    top_k: Option<usize>,

    /// Also print the prompt the generator was given
    #[arg(long)]
    show_prompt: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "event_rag=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RagConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RagConfig::load()?,
    };
    if let Some(top_k) = args.top_k {
        config.retrieval.top_k = top_k;
    }

    let mut pipeline = QueryPipeline::from_config(&config)?;

    let (result, prompt) = pipeline
        .answer_with_prompt(&args.question, Some(args.event.as_str()))
        .await
        .with_context(|| format!("Failed to answer question about {}", args.event))?;

    if args.show_prompt {
        println!("{}\n", prompt);
        println!("{}\n", "-".repeat(60));
    }

    println!("{}", result.answer_text);
    if !result.citations.is_empty() {
        println!("\nSources:");
        println!("{}", result.format_sources());
    }

    Ok(())
}
