// kodegen-frontier: polite, deduplicating crawler
//
// Crawls from the given seeds within the allowed domains and prints the crawl
// report as JSON on stdout. Ctrl-C cancels the crawl and still prints the report.

use anyhow::{Context, Result};
use clap::Parser;
use kodegen_tools_frontier::config::{CrawlConfigBuilder, WithStartUrls};
use kodegen_tools_frontier::{CancellationToken, Collaborators, CrawlConfig, Crawler};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "kodegen-frontier", version, about = "Polite, deduplicating web crawler")]
struct Cli {
    /// Number of concurrent workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// JSON config file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Allowed domain (repeatable); defaults to the seed hosts
    #[arg(short, long = "allow", value_name = "DOMAIN")]
    allow: Vec<String>,

    /// Stop after this many processed pages
    #[arg(long)]
    limit: Option<usize>,

    /// Ignore robots.txt
    #[arg(long)]
    ignore_robots: bool,

    /// Render HTML in a headless browser before extracting links
    #[arg(long)]
    render: bool,

    /// Seed URLs
    #[arg(value_name = "SEED")]
    seeds: Vec<String>,
}

impl Cli {
    fn into_config(self) -> Result<CrawlConfig> {
        let mut builder = match &self.config {
            Some(path) => CrawlConfigBuilder::<WithStartUrls>::from_json_file(path)?,
            None => CrawlConfig::builder().start_urls(Vec::<String>::new()),
        };

        if !self.seeds.is_empty() {
            builder = builder.start_urls(self.seeds);
        }
        if let Some(workers) = self.workers {
            builder = builder.concurrency(workers);
        }
        if !self.allow.is_empty() {
            builder = builder.allowed_domains(self.allow);
        }
        if let Some(limit) = self.limit {
            builder = builder.limit(limit);
        }
        if self.ignore_robots {
            builder = builder.respect_robots(false);
        }
        if self.render {
            builder = builder.render_html(true);
        }

        builder.build().context("Invalid crawl configuration")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("chromiumoxide::handler", log::LevelFilter::Off)
        .filter_module("chromiumoxide::conn", log::LevelFilter::Off)
        .init();

    let config = Cli::parse().into_config()?;
    if config.start_urls().is_empty() {
        anyhow::bail!("no seed URLs given (pass SEED arguments or start_urls in --config)");
    }

    let collaborators = Collaborators::from_config(&config)
        .await
        .context("Failed to set up crawl collaborators")?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!(target: "frontier::coordinator", "Interrupted, stopping crawl");
                cancel.cancel();
            }
        }
    });

    let seeds = config.start_urls().to_vec();
    let report = Crawler::new(config, collaborators)
        .with_cancellation(cancel)
        .run(seeds)
        .await
        .context("Crawl failed")?;

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize crawl report")?
    );
    Ok(())
}
