//! `top-selling-agents` command

use crate::config::{ApiSettings, DEFAULT_SETTINGS_FILE};
use crate::downloader::config::{
    DEFAULT_PAGE_SIZE, DEFAULT_REQUESTS_PER_MINUTE, DEFAULT_REQUESTS_PER_SECOND, MAX_CONCURRENCY,
    MAX_RETRIEVABLE_PAGES,
};
use crate::downloader::{
    LastPagePolicy, PaginatedAggregator, ProgressMode, RateLimit, RetrievalConfig,
};
use crate::fetcher::{create_fetcher, FetcherSource};
use crate::ranking::{top_agents, AgentSales};
use crate::shutdown::SharedShutdown;
use crate::SearchRequest;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

use super::CliError;

/// Parse and validate concurrency value
fn parse_concurrency(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if value == 0 {
        return Err("concurrency must be at least 1".to_string());
    }
    if value > MAX_CONCURRENCY {
        return Err(format!(
            "concurrency {value} exceeds maximum of {MAX_CONCURRENCY}"
        ));
    }
    Ok(value)
}

/// Listing Harvester CLI
#[derive(Parser, Debug)]
#[command(name = "listing-harvester")]
#[command(about = "Rank real estate agents by the number of properties they list for sale", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json or human)
    #[arg(long, global = true, default_value = "human")]
    pub output_format: OutputFormat,

    /// Progress display: bar, log or none
    #[arg(long, global = true, default_value = "bar")]
    pub progress: ProgressMode,

    /// Settings file holding the ApiSettings section
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_FILE)]
    pub settings: PathBuf,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the top N agents with the most properties listed for sale
    TopSellingAgents(TopAgentsArgs),
}

/// Arguments of `top-selling-agents`
#[derive(Parser, Debug, Clone)]
pub struct TopAgentsArgs {
    /// Search terms, e.g. `-t amsterdam tuin`
    #[arg(short = 't', long = "terms", required = true, num_args = 1..)]
    pub terms: Vec<String>,

    /// Number of agents to print
    #[arg(long = "results", default_value_t = 10)]
    pub results: usize,

    /// Use generated listings instead of the remote API (testing purposes only)
    #[arg(long, default_value_t = false)]
    pub fake_api: bool,

    /// Items per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: u32,

    /// Refuse result sets with at least this many pages
    #[arg(long, default_value_t = MAX_RETRIEVABLE_PAGES, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_pages: u32,

    /// Page fetches in flight at once (max 32); the rate limits apply to all of them
    #[arg(long, default_value = "1", value_parser = parse_concurrency)]
    pub concurrency: usize,

    /// Requests allowed per second
    #[arg(long, default_value_t = DEFAULT_REQUESTS_PER_SECOND, value_parser = clap::value_parser!(u32).range(1..))]
    pub per_second: u32,

    /// Requests allowed per minute
    #[arg(long, default_value_t = DEFAULT_REQUESTS_PER_MINUTE, value_parser = clap::value_parser!(u32).range(1..))]
    pub per_minute: u32,

    /// Also request the page numbered with the reported page count
    #[arg(long, default_value_t = false)]
    pub fetch_last_page: bool,
}

impl TopAgentsArgs {
    /// Retrieval settings selected by these arguments
    pub fn retrieval_config(&self) -> RetrievalConfig {
        let last_page = if self.fetch_last_page {
            LastPagePolicy::Fetch
        } else {
            LastPagePolicy::Skip
        };
        RetrievalConfig::default()
            .with_page_size(self.page_size)
            .with_max_pages(self.max_pages)
            .with_max_concurrency(self.concurrency)
            .with_rate_limits(vec![
                RateLimit::per_second(self.per_second),
                RateLimit::per_minute(self.per_minute),
            ])
            .with_last_page(last_page)
    }

    /// Retrieve listings and print the ranking
    pub async fn execute(&self, cli: &Cli, shutdown: SharedShutdown) -> Result<(), CliError> {
        let terms = SearchRequest::new(&self.terms);
        if terms.is_empty() {
            return Err(CliError::InvalidArgument(
                "at least one non-blank search term is required".to_string(),
            ));
        }

        let source = if self.fake_api {
            FetcherSource::Fake
        } else {
            FetcherSource::Http(ApiSettings::load(&cli.settings)?)
        };

        let progress = cli.progress.create_sink();
        let aggregator = PaginatedAggregator::new(create_fetcher(source), self.retrieval_config())?
            .with_progress(progress.clone())
            .with_shutdown(shutdown);

        info!("Searching listings for {:?}", terms.terms().collect::<Vec<_>>());
        let listings = aggregator.search_all(&terms).await;
        progress.finish();
        let listings = listings?;

        let ranking = top_agents(&listings, self.results);
        match cli.output_format {
            OutputFormat::Human => print!("{}", render_table(&ranking, listings.len())),
            OutputFormat::Json => {
                let output = json!({
                    "terms": terms.terms().collect::<Vec<_>>(),
                    "listings": listings.len(),
                    "agents": ranking,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }
        Ok(())
    }
}

/// Plain-text ranking table
pub fn render_table(ranking: &[AgentSales], total_listings: usize) -> String {
    let name_width = ranking
        .iter()
        .map(|agent| agent.agent_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Agent".len());

    let mut out = format!("{:>4}  {:<name_width$}  {:>8}\n", "#", "Agent", "Listings");
    out.push_str(&format!("{}\n", "-".repeat(4 + 2 + name_width + 2 + 8)));
    for (rank, agent) in ranking.iter().enumerate() {
        out.push_str(&format!(
            "{:>4}  {:<name_width$}  {:>8}\n",
            rank + 1,
            agent.agent_name,
            agent.listings
        ));
    }
    out.push_str(&format!("\n{total_listings} listings retrieved\n"));
    out
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable output
    Human,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}
