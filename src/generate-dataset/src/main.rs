//! Dataset generator — writes the seeded synthetic campaign table to the
//! interchange file, replacing any previous run.

use campaign_core::config::AppConfig;
use campaign_datagen::DatasetGenerator;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "generate-dataset")]
#[command(about = "Generate the reproducible synthetic marketing campaign dataset")]
#[command(version)]
struct Cli {
    /// Output CSV path (overrides config)
    #[arg(short, long, env = "CAMPAIGN_INSIGHTS__DATASET__PATH")]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "generate_dataset=info,campaign_datagen=info".into()),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&config.dataset.path));

    info!(path = %output.display(), "Generating controlled, reproducible dataset");

    let summary = DatasetGenerator::new().write_csv(&output)?;

    for (channel, count) in &summary.per_channel {
        info!(channel = %channel, campaigns = count, "Channel composition");
    }
    println!("Dataset saved to {}", summary.output.display());

    Ok(())
}
