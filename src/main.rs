use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use groupcheck::config::{Config, parse_secs};
use groupcheck::error::TableError;
use groupcheck::runner::Runner;
use groupcheck::search::GoogleSearch;
use groupcheck::table;
use groupcheck::validator::{GroupPattern, Validator};

/// Check that search results for each query surface one of the expected groups.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Input table with `Query` and `Expected Groups` columns
    #[arg(long)]
    input: Option<PathBuf>,

    /// Where to write the table with the validation column
    #[arg(long)]
    output: Option<PathBuf>,

    /// Max search results inspected per query
    #[arg(long)]
    result_cap: Option<usize>,

    /// Seconds between result-page fetches
    #[arg(long)]
    request_delay: Option<f64>,

    /// Language hint passed to the search provider
    #[arg(long)]
    lang: Option<String>,

    /// Queries validated at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Also write the run summary as JSON to this path
    #[arg(long)]
    summary: Option<PathBuf>,
}

impl Cli {
    fn apply(self, config: &mut Config) -> anyhow::Result<()> {
        if let Some(input) = self.input {
            config.input_path = input;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(cap) = self.result_cap {
            config.result_cap = cap;
        }
        if let Some(secs) = self.request_delay {
            config.request_delay = parse_secs(secs).context("invalid --request-delay")?;
        }
        if let Some(lang) = self.lang {
            config.lang = lang;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if self.summary.is_some() {
            config.summary_path = self.summary;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Also picks up `log` records from the library.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    let mut config = Config::from_env()?;
    Cli::parse().apply(&mut config)?;

    let mut queries = match table::load(&config.input_path) {
        Ok(t) => t,
        Err(TableError::NotFound(path)) => {
            tracing::error!("input file {} not found", path.display());
            table::write_template(&path)
                .with_context(|| format!("failed to write template {}", path.display()))?;
            tracing::info!(
                "a sample file {} has been created for you to use as a template",
                path.display()
            );
            return Ok(());
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to read {}", config.input_path.display()));
        }
    };

    let provider = GoogleSearch::new(&config)?;
    let pattern = GroupPattern::new(&config.group_host)
        .with_context(|| format!("invalid group host {:?}", config.group_host))?;
    let validator = Validator::new(provider, pattern, config.result_cap);
    let runner = Runner::new(validator, config.concurrency);

    let summary = runner.run(&mut queries).await;

    table::save(&queries, &config.output_path)
        .with_context(|| format!("failed to write {}", config.output_path.display()))?;
    tracing::info!(
        "results have been saved to {}",
        config.output_path.display()
    );

    if let Some(path) = &config.summary_path {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write summary {}", path.display()))?;
    }
    Ok(())
}
