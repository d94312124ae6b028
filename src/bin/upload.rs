use anyhow::{Context, Result};
use azblob_experiment::{
    commands,
    config::Config,
    logging,
    storage::{DefaultCredential, TokenProvider},
};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, level_filters::LevelFilter};

#[derive(Debug, Parser)]
#[command(name = "upload")]
#[command(about = "Upload a timestamped JSON document to the configured blob")]
struct CliArgs {}

async fn run(config: &Config) -> Result<()> {
    let credential: Arc<dyn TokenProvider> =
        Arc::new(DefaultCredential::new().context("failed to create azure credential")?);
    let blob = commands::connect(config, credential).context("failed to create service client")?;

    commands::upload(&blob)
        .await
        .context("failed to upload data")?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            logging::init(LevelFilter::INFO);
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    logging::init(config.log_level);

    let result = run(&config).await;
    match &result {
        Ok(()) => info!("Upload completed successfully"),
        Err(e) => error!("{:#}", e),
    }
    std::process::exit(commands::exit_code(&result));
}
