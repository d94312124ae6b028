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
#[command(name = "download")]
#[command(about = "Download the configured blob, optionally at a specific version")]
struct CliArgs {
    /// Blob version to fetch instead of the current one.
    #[arg(value_name = "VERSION_ID")]
    version_id: Option<String>,
}

async fn run(config: &Config, version_id: Option<&str>) -> Result<()> {
    let credential: Arc<dyn TokenProvider> =
        Arc::new(DefaultCredential::new().context("failed to create azure credential")?);
    let blob = commands::connect(config, credential).context("failed to create service client")?;

    commands::download(&blob, version_id)
        .await
        .context("failed to download data")?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            logging::init(LevelFilter::INFO);
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    logging::init(config.log_level);

    let result = run(&config, args.version_id.as_deref()).await;
    match &result {
        Ok(()) => info!("Download completed successfully"),
        Err(e) => error!("{:#}", e),
    }
    std::process::exit(commands::exit_code(&result));
}

#[cfg(test)]
mod tests {
    use super::CliArgs;
    use clap::Parser;

    #[test]
    fn test_version_id_is_optional() {
        let args = CliArgs::try_parse_from(["download"]).unwrap();
        assert!(args.version_id.is_none());
    }

    #[test]
    fn test_version_id_positional() {
        let args =
            CliArgs::try_parse_from(["download", "2022-03-14T09:26:53.5897932Z"]).unwrap();
        assert_eq!(args.version_id.as_deref(), Some("2022-03-14T09:26:53.5897932Z"));
    }

    #[test]
    fn test_rejects_extra_arguments() {
        assert!(CliArgs::try_parse_from(["download", "v1", "v2"]).is_err());
    }
}
