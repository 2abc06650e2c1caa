use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use etf_sectors::config::AppConfig;
use etf_sectors::pipeline::batch::run_batch;
use etf_sectors::portfolio::{aggregate, load_holdings};
use etf_sectors::utils::{self, format_aud, format_percent};
use etf_sectors::{EtfResponse, Pipeline, ResolutionResult, registry};

#[derive(Parser)]
#[command(name = "etf-sectors", about = "ETF sector breakdown lookup", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Firecrawl API key (overrides config)
    #[arg(long, env = "FIRECRAWL_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the sector breakdown of one fund
    Resolve {
        /// Ticker symbol, e.g. VGS or VGS.AX
        ticker: Option<String>,

        /// Fund page URL (used when the ticker is unknown)
        #[arg(short, long)]
        url: Option<String>,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Resolve every holding in a CSV and print value-weighted sector totals
    Portfolio {
        /// CSV with columns label,ticker,url,value,enabled
        #[arg(default_value = "data/portfolio.csv")]
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// List tickers with a known product page
    Tickers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "etf_sectors=info,warn",
        1 => "etf_sectors=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    if cli.api_key.is_some() {
        config.scraper.api_key = cli.api_key.clone();
    }

    match cli.command {
        Command::Resolve { ticker, url, json } => {
            let pipeline = Pipeline::new(&config).context("Failed to build pipeline")?;
            let outcome = pipeline.resolve(ticker.as_deref(), url.as_deref()).await;

            if json {
                let response = EtfResponse::from(outcome);
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_resolution(&outcome?);
            }
        }

        Command::Portfolio { file, json } => {
            let timer = utils::Timer::start("Portfolio resolution");
            let holdings: Vec<_> = load_holdings(&file)
                .with_context(|| format!("Failed to load holdings from {:?}", file))?
                .into_iter()
                .filter(|h| h.enabled)
                .collect();

            let pipeline = Arc::new(Pipeline::new(&config).context("Failed to build pipeline")?);
            let requests = holdings.iter().map(|h| h.request()).collect();
            let outcomes = run_batch(pipeline, requests, config.pipeline.concurrency).await;

            let resolved: Vec<_> = holdings
                .iter()
                .zip(&outcomes)
                .filter_map(|(h, o)| o.as_ref().ok().map(|r| (h, r)))
                .collect();
            let agg = aggregate(resolved.iter().copied());

            if json {
                println!("{}", serde_json::to_string_pretty(&agg)?);
            } else {
                println!("─────────────────────────────────────────────");
                for (holding, outcome) in holdings.iter().zip(&outcomes) {
                    let status = match outcome {
                        Ok(r) if r.success => format!("ok ({} sectors)", r.sectors.len()),
                        Ok(r) => format!("failed: {}", r.error.as_deref().unwrap_or("no data")),
                        Err(e) => format!("failed: {}", e),
                    };
                    println!("  {:<10} {:>12}  {}", holding.display_name(), format_aud(holding.value), status);
                }
                println!("─────────────────────────────────────────────");
                println!("  Included value: {}", format_aud(agg.total_value));
                for row in &agg.rows {
                    println!(
                        "  {:<24} {:>12} {:>8}",
                        row.sector.label(),
                        format_aud(row.value),
                        format_percent(row.percent)
                    );
                }
                println!("─────────────────────────────────────────────");
            }
            info!(
                "Done: {}/{} funds resolved in {:.2?}",
                resolved.iter().filter(|(_, r)| r.success).count(),
                holdings.len(),
                timer.elapsed()
            );
        }

        Command::Tickers => {
            println!("{} tickers:", registry::ETF_URLS.len());
            for (symbol, url) in registry::ETF_URLS {
                println!("  {:<6} {}", symbol, url);
            }
        }
    }

    Ok(())
}

fn print_resolution(result: &ResolutionResult) {
    println!("─────────────────────────────────────────────");
    if result.success {
        println!("  Source: {}", result.source_url.as_deref().unwrap_or("—"));
        for s in &result.sectors {
            println!("  {:<24} {:>8}", s.sector.label(), format_percent(s.weight));
        }
    } else {
        println!("  {}", result.error.as_deref().unwrap_or("No data found."));
    }
    println!("─────────────────────────────────────────────");
    for a in &result.attempts {
        let detail = a.error.as_deref().or(a.note.as_deref()).unwrap_or("");
        let mark = if a.ok { "✓" } else { "✗" };
        println!("  {} {:<20} {}  {}", mark, a.stage.as_str(), a.url, detail);
    }
}
