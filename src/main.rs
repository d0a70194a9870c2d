//! quarry: deterministic code index with staleness checks and ranked search
//!
//! Commands:
//! - scan: full rebuild of `.quarry/index.db`
//! - verify: report paths that drifted since the last scan (exit code 2 when stale)
//! - search: ranked full-text search grouped by room
//! - callers / callees / graph: call-graph lookups
//! - signal: persist a change signal for a diff range
//! - collect: chunks for a scope, refused when the index is stale
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

use quarry::analysis::AnalyzerRegistry;
use quarry::scanner::{Guardrails, Scanner};
use quarry::scope::{GitDiff, produce_signal};
use quarry::search::{Butler, TomlManifestDecoder};
use quarry::staleness::{self, VerifyMode};
use quarry::{ContentStore, QuarryError, Workspace, call_graph, collect};

#[derive(Parser)]
#[command(name = "quarry")]
#[command(about = "Deterministic code index with staleness checks and ranked search", long_about = None)]
#[command(version)]
struct Cli {
    /// Workspace root (defaults to the current directory)
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    /// Number of parallel threads (defaults to CPU count)
    #[arg(short, long, global = true)]
    threads: Option<usize>,

    /// Optional log file path
    #[arg(short, long, global = true)]
    log: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Fast,
    Strict,
}

impl From<ModeArg> for VerifyMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Fast => VerifyMode::Fast,
            ModeArg::Strict => VerifyMode::Strict,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the index from scratch
    Scan,

    /// Check the index against the working tree
    Verify {
        /// Restrict to paths changed by this diff range (e.g. main..HEAD)
        #[arg(long)]
        range: Option<String>,

        #[arg(long, value_enum, default_value = "fast")]
        mode: ModeArg,
    },

    /// Ranked search over indexed chunks
    Search {
        /// Query text
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Maximum results (0 = configured default, capped at 50)
        #[arg(short = 'n', long, default_value_t = 0)]
        limit: usize,

        /// Only return results grouped under this room
        #[arg(long)]
        room: Option<String>,
    },

    /// Who calls this symbol
    Callers { symbol: String },

    /// What this symbol calls
    Callees {
        symbol: String,

        /// Pick the definition in this file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Calls into and out of one file
    Graph { file: PathBuf },

    /// Resolve a diff range now and save it as a change signal
    Signal { range: String },

    /// Gather indexed chunks for a scope (fails if the index is stale)
    Collect {
        #[arg(long)]
        range: Option<String>,

        #[arg(long, value_enum, default_value = "fast")]
        mode: ModeArg,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log.as_ref(), cli.verbose)?;

    let num_threads = cli.threads.unwrap_or_else(num_cpus::get);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .ok(); // Ignore error if already initialized
    debug!("Using {} threads", num_threads);

    let workspace = Workspace::open(&cli.root)
        .with_context(|| format!("Failed to open workspace: {:?}", cli.root))?;

    match cli.command {
        Commands::Scan => {
            workspace.ensure_dir()?;
            let db_path = workspace.database_path();
            let mut store = ContentStore::open(&db_path)
                .with_context(|| format!("Failed to open index: {:?}", db_path))?;
            let scanner = Scanner::new(&workspace, AnalyzerRegistry::new())?;
            let summary = scanner.scan(&mut store).context("Scan failed")?;
            print_json(&summary)
        }
        Commands::Verify { range, mode } => {
            let store = open_store(&workspace)?;
            let report = staleness::verify(
                &workspace,
                &store,
                range.as_deref(),
                mode.into(),
                &GitDiff::new(),
            )?;
            print_json(&report)?;
            if !report.is_fresh() {
                std::process::exit(2);
            }
            Ok(())
        }
        Commands::Search { query, limit, room } => {
            let store = open_store(&workspace)?;
            let butler = Butler::open(&workspace, &store, &TomlManifestDecoder)?;
            let response = butler.search(&query.join(" "), limit, room.as_deref())?;
            print_json(&response)
        }
        Commands::Callers { symbol } => {
            let store = open_store(&workspace)?;
            print_json(&call_graph::incoming_calls(&store, &symbol)?)
        }
        Commands::Callees { symbol, file } => {
            let store = open_store(&workspace)?;
            let file = file.map(|f| f.to_string_lossy().into_owned());
            match call_graph::outgoing_calls(&store, &symbol, file.as_deref()) {
                Err(QuarryError::UnknownSymbol {
                    symbol,
                    suggestions,
                }) if !suggestions.is_empty() => {
                    anyhow::bail!(
                        "Unknown symbol '{}'. Did you mean: {}?",
                        symbol,
                        suggestions.join(", ")
                    )
                }
                result => print_json(&result?),
            }
        }
        Commands::Graph { file } => {
            let store = open_store(&workspace)?;
            print_json(&call_graph::call_graph(&store, &file.to_string_lossy())?)
        }
        Commands::Signal { range } => {
            let guardrails = Guardrails::from_config(&workspace.config.guardrails)?;
            let signal = produce_signal(&workspace, &range, &GitDiff::new(), &guardrails)?;
            print_json(&signal)
        }
        Commands::Collect { range, mode } => {
            let store = open_store(&workspace)?;
            let pack = collect::collect(
                &workspace,
                &store,
                range.as_deref(),
                mode.into(),
                &GitDiff::new(),
            )?;
            print_json(&pack)
        }
    }
}

/// Initialize logging with optional file output
fn init_logging(log_path: Option<&PathBuf>, verbose: u8) -> Result<()> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    if let Some(log_file) = log_path {
        // With log file: everything the filter allows to file, warn+ to stderr
        let file_appender = tracing_appender::rolling::never(
            log_file
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new(".")),
            log_file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("quarry.log"),
        );

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_ansi(false)
            .with_writer(file_appender.and(std::io::stderr.with_max_level(tracing::Level::WARN)))
            .init();

        eprintln!("📝 Logging to {:?}", log_file);
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}

fn open_store(workspace: &Workspace) -> Result<ContentStore> {
    let db_path = workspace.database_path();
    if !db_path.exists() {
        anyhow::bail!(QuarryError::NotIndexed {
            root: workspace.root.clone()
        });
    }
    ContentStore::open(&db_path).with_context(|| format!("Failed to open index: {:?}", db_path))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to encode output")?;
    println!("{}", json);
    Ok(())
}
