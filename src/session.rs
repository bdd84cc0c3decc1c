// src/session.rs
// =============================================================================
// Interactive mode: the user types URLs (and a few commands) one per line.
//
// A session owns:
// - one RunHistory, which grows by one batch per URL typed
// - one RobotsCache, so repeated lookups for a site are served from memory
// - the probe settings (crawlers + timeout) chosen on the command line
//
// Nothing is saved to disk unless the user runs `export`. Quitting the
// session forgets the history.
//
// Commands:
//   <url>                 probe the URL with the session's crawlers
//   history               table of every result so far (newest first)
//   details               headers and body samples (newest first)
//   robots [url]          show robots.txt for the URL or the last one probed
//   export csv|json PATH  write the history to a file
//   help                  list commands
//   quit / exit           leave (Ctrl-D works too)
//
// Rust concepts:
// - Generic struct Session<F: Fetcher>: tests plug in a scripted fetcher
// - tokio::io::AsyncBufRead: read lines without blocking the runtime
// =============================================================================

use crate::config::ProbeSettings;
use crate::probe::{normalize_url, run_batch, Fetcher, RunHistory};
use crate::report::{self, ExportFormat};
use crate::robots::RobotsCache;
use anyhow::{anyhow, bail, Result};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

// One parsed line of input
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Probe(String),
    History,
    Details,
    Robots(Option<String>),
    Export(ExportFormat, PathBuf),
    Help,
    Quit,
    Nothing,
}

fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "" => Command::Nothing,
        "history" => Command::History,
        "details" => Command::Details,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "robots" if rest.is_empty() => Command::Robots(None),
        "robots" => Command::Robots(Some(rest.to_string())),
        "export" => {
            let (format, path) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("Usage: export csv|json PATH"))?;
            Command::Export(format.parse()?, PathBuf::from(path.trim()))
        }
        // Anything else is treated as a URL
        _ if rest.is_empty() => Command::Probe(word.to_string()),
        _ => bail!("Unknown command '{}'. Type `help` for the list of commands.", word),
    };
    Ok(command)
}

pub struct Session<F: Fetcher> {
    fetcher: F,
    robots: RobotsCache,
    settings: ProbeSettings,
    history: RunHistory,
    last_url: Option<String>,
}

impl<F: Fetcher> Session<F> {
    pub fn new(fetcher: F, robots: RobotsCache, settings: ProbeSettings) -> Self {
        Self {
            fetcher,
            robots,
            settings,
            history: RunHistory::new(),
            last_url: None,
        }
    }

    // Reads commands until `quit` or end of input. A failing command is
    // reported and the session carries on.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        let names: Vec<&str> = self.settings.crawlers.iter().map(|c| c.name.as_str()).collect();
        println!("🤖 Crawlers: {}", names.join(", "));
        println!("Type a URL to probe it, or `help` for commands.");

        let mut lines = input.lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };

            let command = match parse_command(&line) {
                Ok(command) => command,
                Err(e) => {
                    println!("❌ {}", e);
                    continue;
                }
            };

            if command == Command::Quit {
                break;
            }
            if let Err(e) = self.execute(command).await {
                println!("❌ {}", e);
            }
        }

        println!("👋 {} result(s) this session", self.history.len());
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Probe(raw) => self.probe(&raw).await?,
            Command::History => {
                if self.history.is_empty() {
                    println!("No results yet.");
                } else {
                    report::print_table(self.history.latest_first());
                }
            }
            Command::Details => report::print_details(self.history.latest_first()),
            Command::Robots(url) => {
                let url = url
                    .or_else(|| self.last_url.clone())
                    .ok_or_else(|| anyhow!("Probe a URL first, or use `robots URL`"))?;
                println!("{}", self.robots.fetch(&url).await);
            }
            Command::Export(format, path) => {
                if self.history.is_empty() {
                    bail!("Nothing to export yet");
                }
                report::export(self.history.latest_first(), format, &path)?;
                println!("💾 Wrote {}", path.display());
            }
            Command::Help => print_help(),
            Command::Quit | Command::Nothing => {}
        }
        Ok(())
    }

    async fn probe(&mut self, raw: &str) -> Result<()> {
        let url = normalize_url(raw);
        println!("🔍 Probing {} with {} crawler(s)...", url, self.settings.crawlers.len());

        let batch = run_batch(
            &self.fetcher,
            &url,
            &self.settings.crawlers,
            self.settings.timeout,
            &mut self.history,
        )
        .await?;
        report::print_table(batch);

        if self.settings.show_robots {
            println!("\n📜 robots.txt (informational only):");
            println!("{}", self.robots.fetch(&url).await);
        }

        self.last_url = Some(url);
        Ok(())
    }

    #[cfg(test)]
    fn history(&self) -> &RunHistory {
        &self.history
    }
}

fn print_help() {
    println!("Commands:");
    println!("  <url>                 probe the URL with the session's crawlers");
    println!("  history               table of every result so far (newest first)");
    println!("  details               response headers and body samples");
    println!("  robots [url]          show robots.txt (informational only)");
    println!("  export csv|json PATH  write the history to a file");
    println!("  help                  show this list");
    println!("  quit                  leave the session");
}
