// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, written to stderr)
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = nothing blocked, 1 = something blocked,
//    challenged, or unreachable, 2 = error)
//
// Rust concepts used:
// - async/await: Because every crawler is probed concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// - match: Pattern matching to handle different subcommands
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;      // src/cli.rs - command-line parsing
mod config;   // src/config.rs - crawler identities and run settings
mod probe;    // src/probe/ - the probe-and-classify engine
mod report;   // src/report.rs - tables, details, CSV/JSON export
mod robots;   // src/robots.rs - informational robots.txt with a cache
mod session;  // src/session.rs - interactive mode

#[cfg(test)]
mod test_server;

use clap::Parser;
use cli::{Cli, Commands, ProbeArgs};
use config::{CrawlerTable, ProbeSettings};
use probe::{normalize_url, run_batch, BlockVerdict, HttpFetcher, ProbeOutcome, RunHistory};
use report::ExportFormat;
use robots::RobotsCache;
use session::Session;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use anyhow::Result;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every crawler got through
//   Ok(1) = at least one crawler was blocked, challenged, or never answered
//   Err = validation or I/O error (exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Probe {
            url,
            probe,
            json,
            details,
            export_csv,
            export_json,
        } => {
            let output = Output {
                json,
                details,
                export_csv,
                export_json,
            };
            handle_probe(&url, &probe, &output).await
        }
        Commands::Session { probe } => handle_session(&probe).await,
        Commands::List { custom } => handle_list(&custom),
    }
}

// RUST_LOG wins; otherwise warnings only, or debug for our crate with -v
fn init_logging(verbose: bool) {
    let default_directive = if verbose { "crawler_probe=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// How `probe` should present its results
struct Output {
    json: bool,
    details: bool,
    export_csv: Option<PathBuf>,
    export_json: Option<PathBuf>,
}

// Handles the 'probe' subcommand: one batch, then print/export
async fn handle_probe(raw_url: &str, args: &ProbeArgs, output: &Output) -> Result<i32> {
    let settings = ProbeSettings::from_args(args)?;
    let url = normalize_url(raw_url);

    // Keep stdout pure JSON when --json is set
    if !output.json {
        println!("🔍 Probing {} with {} crawler(s)...\n", url, settings.crawlers.len());
    }

    let fetcher = HttpFetcher::new()?;
    let mut history = RunHistory::new();
    let batch = run_batch(&fetcher, &url, &settings.crawlers, settings.timeout, &mut history).await?;
    let exit_code = exit_code_for(batch);

    if output.json {
        println!("{}", report::to_json(batch)?);
    } else {
        report::print_table(batch);
        if output.details {
            report::print_details(batch);
        }
    }

    if settings.show_robots && !output.json {
        let robots = RobotsCache::new()?;
        println!("\n📜 robots.txt (informational only):");
        println!("{}", robots.fetch(&url).await);
    }

    let written = write_exports(&history, output)?;
    for notice in export_notices(output, &written) {
        println!("{}", notice);
    }
    if output.json {
        for path in &written {
            eprintln!("💾 Wrote {}", path.display());
        }
    }

    Ok(exit_code)
}

// Writes the --export-csv / --export-json files, returning the paths written
fn write_exports<'o>(history: &RunHistory, output: &'o Output) -> Result<Vec<&'o Path>> {
    let mut written = Vec::new();
    if let Some(path) = &output.export_csv {
        report::export(history.latest_first(), ExportFormat::Csv, path)?;
        written.push(path.as_path());
    }
    if let Some(path) = &output.export_json {
        report::export(history.latest_first(), ExportFormat::Json, path)?;
        written.push(path.as_path());
    }
    Ok(written)
}

// Confirmation lines for stdout. None with --json, so `| jq` still works.
fn export_notices(output: &Output, written: &[&Path]) -> Vec<String> {
    if output.json {
        return Vec::new();
    }
    written
        .iter()
        .map(|path| format!("💾 Wrote {}", path.display()))
        .collect()
}

// Handles the 'session' subcommand: read commands from stdin until quit
async fn handle_session(args: &ProbeArgs) -> Result<i32> {
    let settings = ProbeSettings::from_args(args)?;
    let mut session = Session::new(HttpFetcher::new()?, RobotsCache::new()?, settings);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    session.run(stdin).await?;

    Ok(0)
}

// Handles the 'list' subcommand
fn handle_list(custom: &[String]) -> Result<i32> {
    let table = CrawlerTable::builtin().with_custom(custom)?;

    println!("{:<18} {}", "NAME", "USER-AGENT");
    println!("{}", "=".repeat(80));
    for crawler in table.iter() {
        println!("{:<18} {}", crawler.name, crawler.user_agent);
    }

    Ok(0)
}

fn exit_code_for(outcomes: &[ProbeOutcome]) -> i32 {
    if outcomes.iter().all(|o| o.blocked == BlockVerdict::NotBlocked) {
        0
    } else {
        1
    }
}
