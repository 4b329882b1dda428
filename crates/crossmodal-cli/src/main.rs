//! Crossmodal - cross-modal semantic search over a text/image catalog
//!
//! Ranks catalog items (text, image, or both) against text queries using
//! CLIP embeddings in a shared vector space.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crossmodal_cli::{load_catalog, render_json, render_text};
use crossmodal_core::{Config, Error, Result};
use crossmodal_embeddings::{LazyClipText, LazyClipVision, ModelManager};
use crossmodal_search::SearchSession;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    eprintln!(
        r#"crossmodal v{VERSION} - cross-modal semantic search

USAGE:
    crossmodal [OPTIONS] COMMAND

COMMANDS:
    search QUERY...     Rank the catalog against one or more text queries
    fetch-models        Download the embedding model files
    version             Print version information

OPTIONS:
    -h, --help          Print this help message
    -v, --version       Print version
    --catalog PATH      JSON catalog file (required for search)
    --top-k N           Results per query (default: from config, 5)
    --model-dir PATH    Directory holding the ONNX model files
    --json              Emit results as JSON

ENVIRONMENT:
    RUST_LOG            Log level filter (default: info)

EXAMPLES:
    # Download the model files once
    crossmodal fetch-models

    # Rank a catalog against a query
    crossmodal search --catalog catalog.json "A pet animal"

    # Multiple queries, JSON output
    crossmodal search --catalog catalog.json --json "A pet animal" "A beach"
"#
    );
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

struct CliArgs {
    command: Option<String>,
    catalog: Option<PathBuf>,
    top_k: Option<usize>,
    model_dir: Option<PathBuf>,
    json: bool,
    queries: Vec<String>,
}

fn parse_args() -> Result<CliArgs> {
    let mut parsed = CliArgs {
        command: None,
        catalog: None,
        top_k: None,
        model_dir: None,
        json: false,
        queries: Vec::new(),
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            "-v" | "--version" => {
                println!("crossmodal {}", VERSION);
                process::exit(0);
            }
            "--catalog" => {
                let value = args
                    .next()
                    .ok_or_else(|| Error::InvalidArgument("--catalog requires a path".into()))?;
                parsed.catalog = Some(PathBuf::from(value));
            }
            "--top-k" => {
                let value = args
                    .next()
                    .ok_or_else(|| Error::InvalidArgument("--top-k requires a number".into()))?;
                let top_k = value.parse::<usize>().map_err(|_| {
                    Error::InvalidArgument(format!("invalid --top-k value '{}'", value))
                })?;
                parsed.top_k = Some(top_k);
            }
            "--model-dir" => {
                let value = args
                    .next()
                    .ok_or_else(|| Error::InvalidArgument("--model-dir requires a path".into()))?;
                parsed.model_dir = Some(PathBuf::from(value));
            }
            "--json" => parsed.json = true,
            other if other.starts_with('-') => {
                return Err(Error::InvalidArgument(format!("unknown option '{}'", other)));
            }
            other => {
                if parsed.command.is_none() {
                    parsed.command = Some(other.to_string());
                } else {
                    parsed.queries.push(other.to_string());
                }
            }
        }
    }

    Ok(parsed)
}

fn model_manager(args: &CliArgs, config: &Config) -> Result<ModelManager> {
    if let Some(dir) = &args.model_dir {
        return Ok(ModelManager::with_base_dir(dir));
    }
    if let Some(dir) = &config.model.model_dir {
        return Ok(ModelManager::with_base_dir(dir));
    }
    ModelManager::new()
}

fn run_fetch_models(args: &CliArgs, config: &Config) -> Result<()> {
    let manager = model_manager(args, config)?;
    let clip_config = manager.ensure_models_available()?;
    println!("Model files ready:");
    println!("  text encoder:   {}", clip_config.text_model_path.display());
    println!("  vision encoder: {}", clip_config.vision_model_path.display());
    println!("  tokenizer:      {}", clip_config.tokenizer_path.display());
    Ok(())
}

fn run_search(args: &CliArgs, config: &Config) -> Result<()> {
    let catalog_path = args
        .catalog
        .as_ref()
        .ok_or_else(|| Error::InvalidArgument("search requires --catalog PATH".into()))?;

    if args.queries.is_empty() {
        return Err(Error::InvalidArgument(
            "search requires at least one query".into(),
        ));
    }

    let top_k = args.top_k.unwrap_or(config.search.default_top_k);

    let manager = model_manager(args, config)?;
    let mut clip_config = manager.ensure_models_available()?;
    clip_config.embedding_dim = config.model.embedding_dim;
    clip_config.input_resolution = config.model.input_resolution;
    clip_config.max_tokens = config.model.max_tokens;

    let text = Arc::new(LazyClipText::new(clip_config.clone()));
    let vision = Arc::new(LazyClipVision::new(clip_config));

    let items = load_catalog(catalog_path)?;
    info!(items = items.len(), "embedding catalog");
    let session = SearchSession::build(text, vision, items, config.embedding.parallelism)?;

    for query in &args.queries {
        let results = session.search(query, top_k)?;
        if args.json {
            println!("{}", render_json(query, &results)?);
        } else {
            print!("{}", render_text(query, &results));
        }
    }

    Ok(())
}

fn run() -> Result<()> {
    let args = parse_args()?;
    let config = Config::load()?;

    match args.command.as_deref() {
        Some("search") => run_search(&args, &config),
        Some("fetch-models") => run_fetch_models(&args, &config),
        Some("version") => {
            println!("crossmodal {}", VERSION);
            Ok(())
        }
        Some(other) => Err(Error::InvalidArgument(format!(
            "unknown command '{}'",
            other
        ))),
        None => {
            print_help();
            Ok(())
        }
    }
}

fn main() {
    init_logging();

    if let Err(e) = run() {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
