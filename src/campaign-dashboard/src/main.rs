//! Campaign Dashboard — renders the filtered marketing dashboard once in the
//! terminal, or serves it as JSON over HTTP for a front end.

use campaign_api::ApiServer;
use campaign_cache::TableCache;
use campaign_core::config::AppConfig;
use campaign_core::{Channel, EnrichedRecord};
use campaign_reporting::render::render_dashboard;
use campaign_reporting::{aggregate, filter, load_and_process, AggregateOutcome, FilterCriteria};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "campaign-dashboard")]
#[command(about = "Interactive marketing campaign performance dashboard")]
#[command(version)]
struct Cli {
    /// Dataset CSV path (overrides config)
    #[arg(long, global = true, env = "CAMPAIGN_INSIGHTS__DATASET__PATH")]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the dashboard once for a selection
    Show {
        /// Channels to include (repeatable or comma-separated; default: all)
        #[arg(long = "channel", value_delimiter = ',')]
        channels: Vec<Channel>,

        /// Regions to include (default: all)
        #[arg(long = "region", value_delimiter = ',')]
        regions: Vec<String>,

        /// Devices to include (default: all)
        #[arg(long = "device", value_delimiter = ',')]
        devices: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Serve the dashboard JSON API
    Serve {
        /// Bind host (overrides config)
        #[arg(long, env = "CAMPAIGN_INSIGHTS__API__HOST")]
        host: Option<String>,

        /// HTTP port (overrides config)
        #[arg(long, env = "CAMPAIGN_INSIGHTS__API__HTTP_PORT")]
        http_port: Option<u16>,

        /// Expose Prometheus metrics on the configured metrics port
        #[arg(long, default_value_t = false)]
        metrics: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct ShowReport<'a> {
    dataset_digest: Option<&'a str>,
    #[serde(flatten)]
    outcome: &'a AggregateOutcome,
    records: &'a [EnrichedRecord],
}

fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "campaign_dashboard=info,campaign_reporting=info,campaign_api=info,tower_http=info".into()
    });
    if json {
        tracing_subscriber::fmt().with_env_filter(env_filter).json().init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}

fn selection_criteria(channels: Vec<Channel>, regions: Vec<String>, devices: Vec<String>) -> FilterCriteria {
    let mut criteria = FilterCriteria::all();
    if !channels.is_empty() {
        criteria = criteria.with_channels(channels);
    }
    if !regions.is_empty() {
        criteria = criteria.with_regions(regions);
    }
    if !devices.is_empty() {
        criteria = criteria.with_devices(devices);
    }
    criteria
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Commands::Serve { .. }));

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(dataset) = cli.dataset {
        config.dataset.path = dataset.display().to_string();
    }

    // One cache per process; the serving session owns it.
    let cache = Arc::new(TableCache::new());

    match cli.command {
        Commands::Show {
            channels,
            regions,
            devices,
            format,
        } => {
            let path = PathBuf::from(&config.dataset.path);
            let table = load_and_process(&path, &cache)?;

            let criteria = selection_criteria(channels, regions, devices);
            let selected = filter(&table, &criteria);
            let outcome = aggregate(&selected);
            info!(
                selected = selected.len(),
                total = table.len(),
                no_data = outcome.is_no_data(),
                "Selection applied"
            );

            match format {
                OutputFormat::Text => print!("{}", render_dashboard(&selected, &outcome)),
                OutputFormat::Json => {
                    let report = ShowReport {
                        dataset_digest: table.source_digest.as_deref(),
                        outcome: &outcome,
                        records: &selected.records,
                    };
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
            }
        }
        Commands::Serve {
            host,
            http_port,
            metrics,
        } => {
            if let Some(host) = host {
                config.api.host = host;
            }
            if let Some(port) = http_port {
                config.api.http_port = port;
            }
            if metrics {
                config.metrics.enabled = true;
            }

            info!(
                dataset = %config.dataset.path,
                host = %config.api.host,
                http_port = config.api.http_port,
                "Configuration loaded"
            );

            // Warm the cache so a missing dataset is reported at startup.
            if let Err(e) = load_and_process(&PathBuf::from(&config.dataset.path), &cache) {
                error!(error = %e, "Dataset not loaded; requests will report it until it is generated");
            }

            let api_server = ApiServer::new(config.clone(), cache.clone());

            if config.metrics.enabled {
                if let Err(e) = api_server.start_metrics().await {
                    error!(error = %e, "Failed to start metrics exporter");
                }
            }

            info!("Campaign dashboard is ready to serve traffic");
            api_server.start_http().await?;
        }
    }

    Ok(())
}
