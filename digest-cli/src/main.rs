//! Daily News Digest
//!
//! Polls the configured feeds, keeps the important stories and mails them
//! as one HTML digest.

mod config;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use digest_news::RssClient;
use digest_services::{render_html, DigestPipeline, Mailer};

use crate::config::{Cli, Credentials};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,digest_cli=debug")),
        )
        .init();

    let cli = Cli::parse();
    let config = match cli.resolve(Credentials::from_env) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    info!(
        "Starting daily digest: {} feeds, policy {}, window {}h",
        config.feeds.len(),
        config.filter.policy,
        config.filter.recency_window.num_hours()
    );

    let client = RssClient::with_timeout(config.fetch_timeout);
    let pipeline = DigestPipeline::new(config.lexicon, config.filter)
        .with_rank_policy(config.rank_policy)
        .with_tie_break(config.tie_break);

    let started = Local::now();
    let (digest, report) = pipeline
        .run(&client, &config.feeds, started.naive_local())
        .await;

    for (reason, count) in &report.rejected {
        info!("Rejected {} entries: {}", count, reason);
    }

    let html = render_html(&digest, started.date_naive());

    if let Some(path) = &config.output {
        std::fs::write(path, &html)
            .with_context(|| format!("Failed to write HTML to {}", path.display()))?;
        info!("HTML written to {}", path.display());
    }

    if let Some(path) = &config.json {
        let selection = serde_json::json!({
            "generated_at": started.to_rfc3339(),
            "report": report,
            "digest": digest,
        });
        std::fs::write(path, serde_json::to_string_pretty(&selection)?)
            .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
        info!("Selection written to {}", path.display());
    }

    let Some(mail) = config.mail else {
        info!("Dry run, {} articles not delivered", digest.len());
        return Ok(());
    };

    let mailer = Mailer::new(mail);
    if let Err(e) = mailer.send(&html, Local::now()).await {
        error!("Digest built but not delivered: {}", e);
        return Err(e.into());
    }

    info!(
        "Digest with {} articles sent to {}",
        digest.len(),
        mailer.config().to.join(", ")
    );
    Ok(())
}
