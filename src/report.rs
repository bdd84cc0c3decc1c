// src/report.rs
// =============================================================================
// Shows probe results in the terminal and writes them to CSV / JSON.
//
// Nothing here computes a verdict; it only formats ProbeOutcome records
// that the probe engine already produced.
//
// Output styles:
// - Table: one line per outcome plus a summary
// - Details: headers and body sample per outcome
// - CSV: the compact columns, suitable for spreadsheets
// - JSON: the full records, headers and body sample included
//
// Rust concepts:
// - impl IntoIterator<Item = &ProbeOutcome>: accept a Vec, a slice, or an
//   iterator like history.latest_first()
// - FromStr: parse "csv" / "json" typed at the session prompt
// =============================================================================

use crate::probe::{BlockVerdict, ProbeOutcome};
use anyhow::{bail, Context, Result};
use std::path::Path;
use std::str::FromStr;

// Detail views get long; only the most recent ones are shown
const MAX_DETAIL_ROWS: usize = 20;

const CSV_HEADER: &str = "crawler,input_url,final_url,status,blocked,reason,elapsed_ms";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => bail!("Unknown export format '{}' (expected csv or json)", other),
        }
    }
}

// Prints results as a human-readable table in the terminal
pub fn print_table<'a>(outcomes: impl IntoIterator<Item = &'a ProbeOutcome>) {
    let outcomes: Vec<&ProbeOutcome> = outcomes.into_iter().collect();

    println!(
        "{:<16} {:<45} {:<5} {:<12} {:<40} {:>8}",
        "CRAWLER", "FINAL URL", "HTTP", "BLOCKED", "REASON", "MS"
    );
    println!("{}", "=".repeat(131));

    for outcome in &outcomes {
        println!(
            "{:<16} {:<45} {:<5} {:<12} {:<40} {:>8}",
            truncate(&outcome.crawler, 16),
            truncate(&outcome.final_url, 45),
            outcome.status,
            format_verdict(outcome.blocked),
            truncate(&outcome.reason, 40),
            outcome.elapsed_ms
        );
    }

    println!();

    let count = |verdict: BlockVerdict| outcomes.iter().filter(|o| o.blocked == verdict).count();

    println!("📊 Summary:");
    println!("   ✅ Allowed: {}", count(BlockVerdict::NotBlocked));
    println!("   ⛔ Blocked: {}", count(BlockVerdict::Blocked));
    println!("   ⚠️  Possible challenge: {}", count(BlockVerdict::Possible));
    println!("   ❓ Unknown: {}", count(BlockVerdict::Unknown));
    println!("   📋 Total: {}", outcomes.len());
}

// Prints every field of the most recent outcomes, headers and body included
pub fn print_details<'a>(outcomes: impl IntoIterator<Item = &'a ProbeOutcome>) {
    for outcome in outcomes.into_iter().take(MAX_DETAIL_ROWS) {
        println!(
            "\n▶ {} → {} (HTTP {}, blocked={})",
            outcome.crawler, outcome.final_url, outcome.status, outcome.blocked
        );
        println!("   Input URL:    {}", outcome.input_url);
        println!("   Final URL:    {}", outcome.final_url);
        println!("   Reason:       {}", outcome.reason);
        println!("   Elapsed (ms): {}", outcome.elapsed_ms);

        println!("   Response headers:");
        if outcome.headers.is_empty() {
            println!("      (none)");
        }
        for (name, value) in &outcome.headers {
            println!("      {}: {}", name, value);
        }

        println!("   Body sample (first 500 chars):");
        if outcome.body_sample.is_empty() {
            println!("      (no body)");
        }
        for line in outcome.body_sample.lines() {
            println!("      {}", line);
        }
    }
}

pub fn to_csv<'a>(outcomes: impl IntoIterator<Item = &'a ProbeOutcome>) -> String {
    let mut csv = String::from(CSV_HEADER);
    for outcome in outcomes {
        csv.push('\n');
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}",
            csv_field(&outcome.crawler, false),
            csv_field(&outcome.input_url, true),
            csv_field(&outcome.final_url, true),
            outcome.status,
            outcome.blocked,
            // Commas in reasons would break naive column splitting
            csv_field(&outcome.reason.replace(',', ";"), true),
            outcome.elapsed_ms
        ));
    }
    csv.push('\n');
    csv
}

pub fn to_json<'a>(outcomes: impl IntoIterator<Item = &'a ProbeOutcome>) -> Result<String> {
    let records: Vec<&ProbeOutcome> = outcomes.into_iter().collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

// Writes outcomes to `path` in the requested format. Prints nothing; the
// caller decides whether a confirmation belongs on stdout.
pub fn export<'a>(
    outcomes: impl IntoIterator<Item = &'a ProbeOutcome>,
    format: ExportFormat,
    path: &Path,
) -> Result<()> {
    let contents = match format {
        ExportFormat::Csv => to_csv(outcomes),
        ExportFormat::Json => to_json(outcomes)?,
    };
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

// Quotes a CSV field (always, or only when it needs it) and doubles inner quotes
fn csv_field(value: &str, always_quote: bool) -> String {
    if always_quote || value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn format_verdict(verdict: BlockVerdict) -> &'static str {
    match verdict {
        BlockVerdict::Blocked => "⛔ true",
        BlockVerdict::Possible => "⚠️  possible",
        BlockVerdict::NotBlocked => "✅ false",
        BlockVerdict::Unknown => "❓ unknown",
    }
}

// Shortens text for table columns without splitting a character
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn outcome(crawler: &str, blocked: BlockVerdict, reason: &str) -> ProbeOutcome {
        let mut headers = BTreeMap::new();
        headers.insert("server".to_string(), "nginx".to_string());
        ProbeOutcome {
            crawler: crawler.to_string(),
            input_url: "https://example.com".to_string(),
            final_url: "https://www.example.com/".to_string(),
            status: 200,
            blocked,
            reason: reason.to_string(),
            elapsed_ms: 42,
            headers,
            body_sample: "<html>".to_string(),
        }
    }

    #[test]
    fn test_csv_layout() {
        let rows = vec![outcome("GPTBot", BlockVerdict::NotBlocked, "OK")];
        let csv = to_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "GPTBot,\"https://example.com\",\"https://www.example.com/\",200,false,\"OK\",42"
        );
    }

    #[test]
    fn test_csv_reason_commas_become_semicolons() {
        let rows = vec![outcome(
            "GPTBot",
            BlockVerdict::Unknown,
            "Fetch failed: error sending request, connection refused",
        )];
        let csv = to_csv(&rows);
        assert!(csv.contains("\"Fetch failed: error sending request; connection refused\""));
        assert!(csv.contains(",unknown,"));
    }

    #[test]
    fn test_csv_quotes_are_doubled() {
        let rows = vec![outcome("My \"Bot\"", BlockVerdict::Possible, "say \"hi\"")];
        let csv = to_csv(&rows);
        assert!(csv.contains("\"My \"\"Bot\"\"\","));
        assert!(csv.contains("\"say \"\"hi\"\"\""));
    }

    #[test]
    fn test_json_has_full_records() {
        let rows = vec![outcome("GPTBot", BlockVerdict::Blocked, "HTTP 403")];
        let json = to_json(&rows).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed[0]["crawler"], "GPTBot");
        assert_eq!(parsed[0]["blocked"], "true");
        assert_eq!(parsed[0]["headers"]["server"], "nginx");
        assert_eq!(parsed[0]["body_sample"], "<html>");
    }

    #[test]
    fn test_export_writes_file() {
        let rows = vec![outcome("GPTBot", BlockVerdict::NotBlocked, "OK")];
        let path = std::env::temp_dir().join(format!("crawler-probe-test-{}.json", std::process::id()));

        export(&rows, ExportFormat::Json, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let parsed: Vec<ProbeOutcome> = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, rows);
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!(" json ".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééééééééé", 6), "ééé...");
    }
}
