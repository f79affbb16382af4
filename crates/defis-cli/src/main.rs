mod lookup;
mod output;
mod portfolio;
mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use defis_analytics::{DeviceKey, DrugKey, PortfolioEntry};
use defis_core::RatingColumn;
use defis_loader::DatasetRepository;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "defis")]
#[command(about = "DEFIS pharma reporting command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the root groups of the combined dataset
    Groups,
    /// List the laboratories of the revenue dataset
    Labs,
    /// Look up a drug; without a value, list the values for the key
    Drug {
        /// Lookup key: name, cis or cip13
        #[arg(long, default_value = "name", value_parser = parse_drug_key)]
        by: DrugKey,
        value: Option<String>,
        /// Write the presentations to an .xlsx file or directory
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Look up a medical device; without a value, list the values for the key
    Device {
        /// Lookup key: name or dossier
        #[arg(long, default_value = "name", value_parser = parse_device_key)]
        by: DeviceKey,
        value: Option<String>,
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Quality profile of one group
    Group {
        group: String,
        /// Compare with a second group
        #[arg(long)]
        compare: Option<String>,
        /// Rating column: benefit (SMR/SR) or improvement (ASMR/ASR)
        #[arg(long, default_value = "benefit", value_parser = parse_column)]
        column: RatingColumn,
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Revenue breakdown of one laboratory
    Revenue {
        lab: String,
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Weighted multi-group rating profile
    Portfolio {
        /// A GROUP=WEIGHT pair; repeat for each group
        #[arg(long = "entry", value_parser = portfolio::parse_entry)]
        entries: Vec<PortfolioEntry>,
        /// Groups given equal weights when no --entry is set
        #[arg(long = "group")]
        groups: Vec<String>,
        #[arg(long, default_value = "benefit", value_parser = parse_column)]
        column: RatingColumn,
        /// Write the weight table to an .xlsx file or directory
        #[arg(long)]
        export: Option<PathBuf>,
        /// Write the weighted profile to an .xlsx file or directory
        #[arg(long)]
        profile_export: Option<PathBuf>,
    },
}

fn parse_column(raw: &str) -> Result<RatingColumn, String> {
    raw.parse()
}

fn parse_drug_key(raw: &str) -> Result<DrugKey, String> {
    raw.parse().map_err(|e: defis_analytics::AnalyticsError| e.to_string())
}

fn parse_device_key(raw: &str) -> Result<DeviceKey, String> {
    raw.parse().map_err(|e: defis_analytics::AnalyticsError| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = defis_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let repo = DatasetRepository::from_config(&config)?;

    match cli.command {
        Commands::Groups => report::run_groups(&repo).await?,
        Commands::Labs => report::run_labs(&repo).await?,
        Commands::Drug { by, value, export } => {
            lookup::run_drug(&repo, by, value.as_deref(), export.as_deref()).await?;
        }
        Commands::Device { by, value, export } => {
            lookup::run_device(&repo, by, value.as_deref(), export.as_deref()).await?;
        }
        Commands::Group {
            group,
            compare,
            column,
            export,
        } => {
            report::run_group(&repo, &group, compare.as_deref(), column, export.as_deref())
                .await?;
        }
        Commands::Revenue { lab, export } => {
            report::run_revenue(&repo, &lab, export.as_deref()).await?;
        }
        Commands::Portfolio {
            entries,
            groups,
            column,
            export,
            profile_export,
        } => {
            let entries = portfolio::resolve_entries(entries, &groups);
            portfolio::run_portfolio(
                &repo,
                entries,
                column,
                export.as_deref(),
                profile_export.as_deref(),
            )
            .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
