// src/config.rs
// =============================================================================
// The crawler identities we can impersonate, and the settings for a run.
//
// A crawler identity is just a name ("GPTBot") and the exact user-agent
// string that crawler sends. The built-in table covers the well-known AI and
// search crawlers; users can add their own (or override one) with
// `--ua NAME=USER_AGENT`.
//
// The table keeps insertion order. That order only matters for display
// (`crawler-probe list`); results always follow the order the user asked for.
//
// Rust concepts:
// - const arrays of tuples: compile-time data with no allocation
// - Builder-style methods that take `self` and return Result<Self, _>
// =============================================================================

use crate::cli::ProbeArgs;
use crate::probe::ValidationError;
use std::time::Duration;

// Known AI / search crawler user-agents. Edit or extend as crawlers change.
const BUILTIN_CRAWLERS: [(&str, &str); 9] = [
    (
        "GPTBot",
        "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko; compatible; GPTBot/1.0; +https://openai.com/gptbot)",
    ),
    ("ChatGPT-User", "Mozilla/5.0 (compatible; ChatGPT-User; +https://openai.com/bot)"),
    ("OAI-SearchBot", "Mozilla/5.0 (compatible; OAI-SearchBot/1.0; +https://openai.com/searchbot)"),
    ("PerplexityBot", "Mozilla/5.0 (compatible; PerplexityBot/1.0; +https://www.perplexity.ai/bot)"),
    ("ClaudeBot", "ClaudeBot/1.0 (+https://www.anthropic.com/claudebot)"),
    ("Grok", "GrokBot/1.0 (+https://x.ai/grok)"),
    ("GoogleOther", "GoogleOther"),
    ("Google-Extended", "Google-Extended"),
    ("CCBot", "CCBot/2.0 (+https://commoncrawl.org/faq/)"),
];

/// Crawlers probed when the user doesn't pick any
pub const DEFAULT_SELECTION: [&str; 2] = ["GPTBot", "OAI-SearchBot"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlerIdentity {
    pub name: String,
    pub user_agent: String,
}

impl CrawlerIdentity {
    pub fn new(name: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user_agent: user_agent.into(),
        }
    }

    // Parses "NAME=USER_AGENT" (the `--ua` flag)
    fn parse(definition: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidCustomCrawler(definition.to_string());

        let (name, user_agent) = definition.split_once('=').ok_or_else(invalid)?;
        let (name, user_agent) = (name.trim(), user_agent.trim());
        if name.is_empty() || user_agent.is_empty() {
            return Err(invalid());
        }

        Ok(Self::new(name, user_agent))
    }
}

/// Name -> user-agent table with unique names and stable order
#[derive(Debug, Clone)]
pub struct CrawlerTable {
    entries: Vec<CrawlerIdentity>,
}

impl CrawlerTable {
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_CRAWLERS
                .iter()
                .map(|(name, user_agent)| CrawlerIdentity::new(*name, *user_agent))
                .collect(),
        }
    }

    /// Applies `--ua NAME=USER_AGENT` entries on top of the table
    pub fn with_custom(mut self, definitions: &[String]) -> Result<Self, ValidationError> {
        for definition in definitions {
            self.upsert(CrawlerIdentity::parse(definition)?);
        }
        Ok(self)
    }

    // Existing names keep their position; new names go at the end
    fn upsert(&mut self, identity: CrawlerIdentity) {
        match self.entries.iter_mut().find(|entry| entry.name == identity.name) {
            Some(existing) => existing.user_agent = identity.user_agent,
            None => self.entries.push(identity),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CrawlerIdentity> {
        self.entries.iter()
    }

    // Exact name first, then a case-insensitive match ("gptbot" finds "GPTBot")
    pub fn get(&self, name: &str) -> Option<&CrawlerIdentity> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .or_else(|| self.entries.iter().find(|entry| entry.name.eq_ignore_ascii_case(name)))
    }

    /// Resolves names in the caller's order, dropping repeats.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<CrawlerIdentity>, ValidationError> {
        let mut selected: Vec<CrawlerIdentity> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            let identity = self
                .get(name)
                .ok_or_else(|| ValidationError::UnknownCrawler(name.to_string()))?;
            if !selected.iter().any(|s| s.name == identity.name) {
                selected.push(identity.clone());
            }
        }
        Ok(selected)
    }
}

/// Everything a batch needs besides the URL
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub crawlers: Vec<CrawlerIdentity>,
    /// Per-request timeout
    pub timeout: Duration,
    pub show_robots: bool,
}

impl ProbeSettings {
    pub fn from_args(args: &ProbeArgs) -> Result<Self, ValidationError> {
        let table = CrawlerTable::builtin().with_custom(&args.custom)?;

        let crawlers = if args.all {
            table.iter().cloned().collect()
        } else if args.crawlers.is_empty() {
            table.select(&DEFAULT_SELECTION)?
        } else {
            table.select(&args.crawlers)?
        };

        Ok(Self {
            crawlers,
            timeout: Duration::from_secs(args.timeout),
            show_robots: args.robots,
        })
    }
}
