//! Command-line flags and the resolved run configuration

use std::path::PathBuf;
use std::time::Duration;

use chrono::TimeDelta;
use clap::{Parser, ValueEnum};
use thiserror::Error;

use digest_core::{DigestError, Lexicon, MatchStrategy};
use digest_news::{default_feeds, RssFeed, DEFAULT_FETCH_TIMEOUT};
use digest_services::{FilterConfig, FilterPolicy, MailConfig, RankPolicy, TieBreak};

/// Longest accepted `--window-days`
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// Problems detected before any network activity
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing credential: set {0}")]
    MissingCredential(&'static str),

    #[error("Invalid recipient list: {0}")]
    InvalidRecipient(String),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Failed to load lexicon: {0}")]
    Lexicon(#[from] DigestError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RankMode {
    /// Best category per article, capped per category
    PerCategory,
    /// One flat list of the highest scores
    Global,
}

#[derive(Debug, Parser)]
#[command(name = "dagens-digest", about = "Build and mail the daily Swedish news digest")]
pub struct Cli {
    /// Feed URL to poll (repeatable); the built-in Swedish feeds when omitted
    #[arg(long = "feed")]
    pub feeds: Vec<String>,

    /// Recipient addresses, comma separated; defaults to the sender
    #[arg(long = "to", env = "DIGEST_RECIPIENTS", value_delimiter = ',')]
    pub to: Vec<String>,

    /// JSON lexicon replacing the built-in one
    #[arg(long, env = "DIGEST_LEXICON")]
    pub lexicon: Option<PathBuf>,

    /// Recency window in days
    #[arg(long, default_value_t = 1)]
    pub window_days: u32,

    /// Relevance policy: hard-news-gate or score-only
    #[arg(long, default_value_t = FilterPolicy::HardNewsGate)]
    pub policy: FilterPolicy,

    #[arg(long, value_enum, default_value_t = RankMode::PerCategory)]
    pub rank: RankMode,

    #[arg(long, default_value_t = 5)]
    pub max_per_category: usize,

    /// Size of the flat list with `--rank global`
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Category tie-break: lexicon-order or lexicographic
    #[arg(long, default_value_t = TieBreak::LexiconOrder)]
    pub tie_break: TieBreak,

    /// Keyword matching: substring or word-boundary
    #[arg(long, default_value_t = MatchStrategy::Substring)]
    pub match_strategy: MatchStrategy,

    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    pub fetch_timeout_secs: u64,

    /// Build the digest without credentials or delivery
    #[arg(long)]
    pub dry_run: bool,

    /// Write the rendered HTML to this file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Write the selected articles as JSON to this file
    #[arg(long)]
    pub json: Option<PathBuf>,

    #[arg(long, env = "SMTP_HOST", default_value = "smtp.gmail.com")]
    pub smtp_host: String,

    #[arg(long, env = "SMTP_PORT", default_value_t = 587)]
    pub smtp_port: u16,
}

/// Sender account read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub address: String,
    pub password: String,
}

impl Credentials {
    pub const ADDRESS_VAR: &'static str = "EMAIL_ADDRESS";
    pub const PASSWORD_VAR: &'static str = "EMAIL_PASSWORD";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve credentials through `lookup`; blank values count as missing
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingCredential(key))
        };
        Ok(Self {
            address: read(Self::ADDRESS_VAR)?,
            password: read(Self::PASSWORD_VAR)?,
        })
    }
}

/// Everything a run needs, validated
#[derive(Debug)]
pub struct DigestConfig {
    pub feeds: Vec<RssFeed>,
    pub lexicon: Lexicon,
    pub filter: FilterConfig,
    pub rank_policy: RankPolicy,
    pub tie_break: TieBreak,
    pub fetch_timeout: Duration,
    /// `None` on a dry run
    pub mail: Option<MailConfig>,
    pub output: Option<PathBuf>,
    pub json: Option<PathBuf>,
}

impl Cli {
    /// Validate the flags and attach the credentials.
    ///
    /// `credentials` is consulted only when the digest is to be delivered.
    pub fn resolve(
        self,
        credentials: impl FnOnce() -> Result<Credentials, ConfigError>,
    ) -> Result<DigestConfig, ConfigError> {
        if !(1..=MAX_WINDOW_DAYS).contains(&self.window_days) {
            return Err(ConfigError::InvalidSetting(format!(
                "--window-days must be between 1 and {}",
                MAX_WINDOW_DAYS
            )));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting("--fetch-timeout-secs must be at least 1".into()));
        }

        let mail = if self.dry_run {
            None
        } else {
            let credentials = credentials()?;
            Some(mail_config(&self, credentials)?)
        };

        let lexicon = match &self.lexicon {
            Some(path) => Lexicon::from_path(path)?,
            None => Lexicon::swedish_default(),
        };

        let feeds = if self.feeds.is_empty() {
            default_feeds()
        } else {
            self.feeds.iter().map(String::as_str).map(RssFeed::from_url).collect()
        };

        let filter = FilterConfig {
            policy: self.policy,
            recency_window: TimeDelta::days(i64::from(self.window_days)),
            strategy: self.match_strategy,
            ..FilterConfig::default()
        };

        let rank_policy = match self.rank {
            RankMode::PerCategory => RankPolicy::PerCategory {
                max_per_category: self.max_per_category,
            },
            RankMode::Global => RankPolicy::GlobalTopN { limit: self.limit },
        };

        Ok(DigestConfig {
            feeds,
            lexicon,
            filter,
            rank_policy,
            tie_break: self.tie_break,
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            mail,
            output: self.output,
            json: self.json,
        })
    }
}

fn mail_config(cli: &Cli, credentials: Credentials) -> Result<MailConfig, ConfigError> {
    let to: Vec<String> = cli
        .to
        .iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect();
    if let Some(bad) = to.iter().find(|r| !r.contains('@')) {
        return Err(ConfigError::InvalidRecipient(bad.clone()));
    }
    let to = if to.is_empty() {
        vec![credentials.address.clone()]
    } else {
        to
    };

    Ok(MailConfig {
        smtp_host: cli.smtp_host.clone(),
        smtp_port: cli.smtp_port,
        from: credentials.address.clone(),
        to,
        username: credentials.address,
        password: credentials.password,
    })
}
