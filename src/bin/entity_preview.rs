//! Entity Preview
//!
//! Loads an entity document and prints the rendered entity page (or the
//! view patches it produces) to stdout.

use clap::{Parser, ValueEnum};
use entity_sheet::fetch::Fetcher;
use entity_sheet::view::{plan, Page};
use entity_sheet::{EntityRenderer, InitCoordinator, RenderResult, RendererConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// Full HTML page
    Html,
    /// View patches as JSON
    Patches,
}

/// Render an entity JSON document onto the standard entity page
#[derive(Parser, Debug)]
#[command(name = "entity_preview")]
#[command(about = "Render an entity JSON document onto the standard entity page")]
struct Args {
    /// Path or URL of the entity document (defaults to the configured source)
    source: Option<String>,

    /// TOML renderer configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory relative paths resolve against
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    /// Override the link click delay (ms)
    #[arg(long)]
    click_delay_ms: Option<u64>,

    /// Allow cached responses instead of forcing a fresh fetch
    #[arg(long)]
    keep_cache: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "html")]
    format: Format,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "entity_sheet=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match RendererConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::from(2);
            }
        },
        None => RendererConfig::default(),
    };

    let mut options = config.load_options();
    if let Some(delay) = args.click_delay_ms {
        options.click_delay_ms = delay;
    }
    if args.keep_cache {
        options.bypass_cache = false;
    }

    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut renderer = EntityRenderer::with_fetcher(config, Fetcher::with_base_dir(&args.base_dir));
    let mut page = Page::standard(args.source.as_deref());
    let mut coordinator = InitCoordinator::new();
    let result = rt.block_on(coordinator.load(
        &mut renderer,
        &mut page,
        args.source.as_deref(),
        options,
    ));

    let doc = match result {
        RenderResult::Loaded(doc) => doc,
        RenderResult::Failed(err) => {
            eprintln!("Failed to render entity: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match args.format {
        Format::Html => print!("{}", page.to_html()),
        Format::Patches => match serde_json::to_string_pretty(&plan(&doc)) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize patches: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }
    ExitCode::SUCCESS
}
