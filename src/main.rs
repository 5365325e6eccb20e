//! Context Batcher CLI
//!
//! Command-line interface for token-budgeted batching of context files,
//! record counting and model invocation. Prints JSON on stdout; logs go to
//! stderr.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use context_batcher::{
    // Batching
    BatchSummary, ContextBatcher, RecordFormat,
    // Context
    count_records, count_records_in_file, count_tokens, detect_format,
    // Config
    Config,
    // Invocation
    handle, BedrockClient, HandlerResponse, InvocationEvent, ModelKind,
};

#[derive(Parser)]
#[command(name = "context-batcher")]
#[command(about = "Context Batcher - token-budgeted batching for LLM requests", long_about = None)]
struct Cli {
    /// Config file (JSON); defaults to the user config dir
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Size a context file against the ceiling and write the first batch
    Batch {
        /// Context file (.csv, .json or .jsonl)
        path: PathBuf,
        /// Prompt text
        #[arg(short, long, conflicts_with = "prompt_file")]
        prompt: Option<String>,
        /// Read the prompt from a file
        #[arg(long)]
        prompt_file: Option<PathBuf>,
        /// Token ceiling (default from config: 60000)
        #[arg(short, long)]
        ceiling: Option<u32>,
        /// Directory for batch_inicial.<ext>
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Count records in a file (or - to read content from stdin)
    Count {
        target: String,
    },
    /// Detect the record format of a path
    Detect {
        path: PathBuf,
    },
    /// Token counting commands
    Tokens {
        #[command(subcommand)]
        action: TokensAction,
    },
    /// Build the prompt, batch the context and invoke a model
    Invoke {
        /// Text embedded in the prompt template
        #[arg(long)]
        context: Option<String>,
        /// Context file to batch and attach
        #[arg(long)]
        context_path: Option<PathBuf>,
        /// nova-pro, claude or llama
        #[arg(short, long, default_value = "nova-pro")]
        model: ModelKind,
        /// Read the whole event from a JSON file instead
        #[arg(long, conflicts_with_all = ["context", "context_path"])]
        event: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum TokensAction {
    /// Count tokens in text
    Count {
        /// Text to count (or - to read from stdin)
        text: String,
    },
}

// ============ Output Types ============

#[derive(Serialize)]
struct CountOutput {
    records: usize,
}

#[derive(Serialize)]
struct DetectOutput {
    format: RecordFormat,
}

#[derive(Serialize)]
struct TokenCountOutput {
    tokens: u32,
}

// ============ Main ============

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = Config::load(cli.config.as_deref())
        .context("failed to load configuration")
        .and_then(|config| match cli.command {
            Commands::Batch { path, prompt, prompt_file, ceiling, output_dir } => {
                handle_batch(config, &path, prompt, prompt_file, ceiling, output_dir)
            }
            Commands::Count { target } => handle_count(&target),
            Commands::Detect { path } => handle_detect(&path),
            Commands::Tokens { action } => handle_tokens(action),
            Commands::Invoke { context, context_path, model, event } => {
                handle_invoke(&config, context, context_path, model, event)
            }
        });

    match result {
        Ok(json) => println!("{}", json),
        Err(e) => {
            let error = serde_json::json!({ "error": format!("{:#}", e) });
            println!("{}", error);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn read_stdin() -> anyhow::Result<String> {
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

// ============ Handlers ============

fn handle_batch(
    mut config: Config,
    path: &Path,
    prompt: Option<String>,
    prompt_file: Option<PathBuf>,
    ceiling: Option<u32>,
    output_dir: Option<PathBuf>,
) -> anyhow::Result<String> {
    if let Some(ceiling) = ceiling {
        config.batcher.ceiling = ceiling;
    }
    if let Some(dir) = output_dir {
        config.batcher.output_dir = dir;
    }
    config.validate()?;

    let prompt = match (prompt, prompt_file) {
        (Some(text), _) => text,
        (None, Some(file)) => std::fs::read_to_string(&file)
            .with_context(|| format!("failed to read prompt file {}", file.display()))?,
        (None, None) => String::new(),
    };

    let batcher = ContextBatcher::new(&config.batcher, &prompt, Some(path))?;
    let summary: BatchSummary = batcher.summary();
    Ok(serde_json::to_string(&summary)?)
}

fn handle_count(target: &str) -> anyhow::Result<String> {
    let records = if target == "-" {
        count_records(&read_stdin()?)
    } else {
        count_records_in_file(Path::new(target))?
    };
    Ok(serde_json::to_string(&CountOutput { records })?)
}

fn handle_detect(path: &Path) -> anyhow::Result<String> {
    let format = detect_format(path)?;
    Ok(serde_json::to_string(&DetectOutput { format })?)
}

fn handle_tokens(action: TokensAction) -> anyhow::Result<String> {
    match action {
        TokensAction::Count { text } => {
            let input = if text == "-" { read_stdin()? } else { text };
            let output = TokenCountOutput { tokens: count_tokens(&input) };
            Ok(serde_json::to_string(&output)?)
        }
    }
}

fn handle_invoke(
    config: &Config,
    context: Option<String>,
    context_path: Option<PathBuf>,
    model: ModelKind,
    event_file: Option<PathBuf>,
) -> anyhow::Result<String> {
    let event = match event_file {
        Some(file) => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read event file {}", file.display()))?;
            serde_json::from_str::<InvocationEvent>(&raw)
                .with_context(|| format!("invalid event file {}", file.display()))?
        }
        None => InvocationEvent { context, context_path, model },
    };

    let client = BedrockClient::new(&config.inference)?;
    let response: HandlerResponse = handle(&event, config, &client);
    if !response.is_success() {
        anyhow::bail!("{}", response.body["error"].as_str().unwrap_or("invocation failed"));
    }
    Ok(serde_json::to_string(&response)?)
}
