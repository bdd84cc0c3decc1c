// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Subcommands:
// - probe: test one URL with a set of crawler user-agents
// - session: interactive mode, many URLs with one shared history
// - list: show the crawler identities we know about
//
// The options shared by `probe` and `session` live in ProbeArgs and are
// pulled into both with #[command(flatten)].
//
// Rust concepts:
// - Derive macros: Parser, Subcommand, Args generate the parsing code
// - value_parser ranges: clap rejects out-of-range numbers for us
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "crawler-probe",
    version = "0.1.0",
    about = "Check whether a website blocks or challenges known AI crawlers",
    long_about = "crawler-probe requests a page using the user-agent strings of popular AI and search \
                  crawlers (GPTBot, ClaudeBot, PerplexityBot, ...) and reports whether the site \
                  appears to block or challenge each one. It does not enforce robots.txt; it only \
                  inspects how the server responds."
)]
pub struct Cli {
    /// Show debug logs on stderr (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe a URL once with the selected crawlers
    ///
    /// Example: crawler-probe probe example.com -c GPTBot -c ClaudeBot
    Probe {
        /// Website URL (a bare domain like example.com is fine)
        url: String,

        #[command(flatten)]
        probe: ProbeArgs,

        /// Print the results as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Also print response headers and a body sample for each crawler
        #[arg(long)]
        details: bool,

        /// Write the results to a CSV file
        #[arg(long, value_name = "PATH")]
        export_csv: Option<PathBuf>,

        /// Write the full results (headers and body sample included) to a JSON file
        #[arg(long, value_name = "PATH")]
        export_json: Option<PathBuf>,
    },

    /// Interactive mode: type URLs one per line, results accumulate
    ///
    /// Type `help` at the prompt for the list of commands.
    Session {
        #[command(flatten)]
        probe: ProbeArgs,
    },

    /// List the known crawler names and their user-agent strings
    List {
        /// Add or override a crawler: NAME=USER_AGENT (repeatable)
        #[arg(long = "ua", value_name = "NAME=USER_AGENT")]
        custom: Vec<String>,
    },
}

/// Options shared by `probe` and `session`
#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    /// Crawler to simulate (repeatable). Defaults to GPTBot and OAI-SearchBot
    #[arg(short = 'c', long = "crawler", value_name = "NAME")]
    pub crawlers: Vec<String>,

    /// Simulate every known crawler
    #[arg(long, conflicts_with = "crawlers")]
    pub all: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u64).range(5..=30))]
    pub timeout: u64,

    /// Add or override a crawler: NAME=USER_AGENT (repeatable)
    #[arg(long = "ua", value_name = "NAME=USER_AGENT")]
    pub custom: Vec<String>,

    /// Also show the site's robots.txt (informational only)
    #[arg(long)]
    pub robots: bool,
}
