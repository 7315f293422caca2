use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};

use filing_metrics::common::constants::CONFIG_ENV_VAR;
use filing_metrics::config::PipelineConfig;
use filing_metrics::domain::Dataset;
use filing_metrics::observability;
use filing_metrics::pipeline::processing::filter::FilterQuery;
use filing_metrics::{build_quarter_axis, filter_dataset, process_dataset};

#[derive(Parser)]
#[command(name = "filing-metrics")]
#[command(about = "Validate, join and filter SEC filing metric extracts")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// TOML configuration file (falls back to $FILING_METRICS_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Companies extract: URL or path
    #[arg(long)]
    companies: Option<String>,
    /// Filings extract: URL or path
    #[arg(long)]
    filings: Option<String>,
    /// Metrics extract: URL or path
    #[arg(long)]
    metrics: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and join the three extracts, then print a summary
    Process {
        #[command(flatten)]
        sources: SourceArgs,
        /// Write the full dataset as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Process the extracts and print records matching a company/quarter selection
    Filter {
        #[command(flatten)]
        sources: SourceArgs,
        /// Company name to include (repeatable; none means all)
        #[arg(long = "company")]
        companies: Vec<String>,
        #[arg(long)]
        start_year: i64,
        #[arg(long)]
        end_year: i64,
        #[arg(long, default_value_t = 1)]
        start_quarter: i64,
        #[arg(long, default_value_t = 4)]
        end_quarter: i64,
        /// Write matching records as JSON instead of printing them
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the quarter axis between two years
    Axis {
        #[arg(long)]
        min_year: i64,
        #[arg(long)]
        max_year: i64,
        /// TOML configuration file (falls back to $FILING_METRICS_CONFIG)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from));
    match path {
        Some(path) => PipelineConfig::from_file(&path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn resolve_config(args: SourceArgs) -> Result<PipelineConfig> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(companies) = args.companies {
        config.sources.companies = companies;
    }
    if let Some(filings) = args.filings {
        config.sources.filings = filings;
    }
    if let Some(metrics) = args.metrics {
        config.sources.metrics = metrics;
    }
    Ok(config)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "wrote output");
    Ok(())
}

fn print_summary(dataset: &Dataset) {
    let stats = &dataset.stats;
    println!("\n📊 Dataset summary:");
    println!("   Companies: {}", dataset.companies.len());
    println!(
        "   Years: {}-{} ({} distinct)",
        dataset.date_range.min,
        dataset.date_range.max,
        dataset.years.len()
    );
    println!("   Records: {}", dataset.combined_data.len());
    println!(
        "   Rows accepted: companies {}/{}, filings {}/{}, metrics {}/{}",
        stats.valid_companies,
        stats.raw_companies,
        stats.valid_filings,
        stats.raw_filings,
        stats.valid_metrics,
        stats.raw_metrics
    );
    println!(
        "   Dropped: {} duplicate, {} without filing, {} without company, {} bad date, {} out of bounds",
        stats.duplicate_metrics,
        stats.missing_filing,
        stats.missing_company,
        stats.invalid_date,
        stats.out_of_bounds
    );
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Process { sources, output } => {
            let config = resolve_config(sources)?;
            let dataset = process_dataset(config).await?;
            print_summary(&dataset);
            if let Some(path) = output {
                write_json(&path, &dataset)?;
            }
        }
        Commands::Filter {
            sources,
            companies,
            start_year,
            end_year,
            start_quarter,
            end_quarter,
            output,
        } => {
            let config = resolve_config(sources)?;
            let dataset = process_dataset(config.clone()).await?;
            let query = FilterQuery::new(companies, start_year, end_year)
                .with_quarters(start_quarter, end_quarter);
            let records = filter_dataset(&dataset.grouped_data, &query, &config)?;

            match output {
                Some(path) => write_json(&path, &records)?,
                None => {
                    for record in &records {
                        println!(
                            "{}\t{}\t{}\t{}\tccp={}\tltd={}\t{}",
                            record.date_string,
                            record.quarter_label,
                            record.symbol,
                            record.company,
                            record.ccp,
                            record.ltd,
                            record.form_url
                        );
                    }
                }
            }
            println!("\n{} matching records", records.len());
        }
        Commands::Axis {
            min_year,
            max_year,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            for label in build_quarter_axis(min_year, max_year, &config)? {
                println!("{}", label.label);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    observability::init_logging();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}
