#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use output::OutputMode;
use planner_core::PlannerConfig;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "vplan: course-structure post-processing for Visora plans",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Path to a TOML file overriding the pipeline defaults.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    const fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Run the full pipeline over a structure document",
        long_about = "Validate, repair, rebalance, and project a raw structure document.",
        after_help = "EXAMPLES:\n    # Process a saved provider response toward a 4-hour plan\n    vplan process structure.json --hours 4\n\n    # Pipe from stdin, machine-readable output\n    cat structure.json | vplan process --hours 4 --json"
    )]
    Process(cmd::process::ProcessArgs),

    #[command(
        about = "Validate a structure document without transforming it",
        long_about = "Report recovered defects and cycle-flagged subtopics; leave the document alone.",
        after_help = "EXAMPLES:\n    # Inspect a document's defects\n    vplan check structure.json\n\n    # Machine-readable report\n    vplan check structure.json --json"
    )]
    Check(cmd::check::CheckArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("VPLAN_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "planner=debug,info"
        } else {
            "planner=warn,error"
        })
    });

    let format = env::var("VPLAN_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    if format.as_str() == "json" {
        registry
            .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

/// Load the pipeline config, falling back to defaults when no file is given.
fn load_config(path: Option<&Path>) -> anyhow::Result<PlannerConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
        }
        None => Ok(PlannerConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let config = load_config(cli.config.as_deref())?;
    let output = cli.output_mode();

    match cli.command {
        Commands::Process(ref args) => cmd::process::run_process(args, output, &config),
        Commands::Check(ref args) => cmd::check::run_check(args, output, &config),
    }
}
