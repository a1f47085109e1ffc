//! # adm-publish CLI Interface (Module)
//!
//! Command parsing and the async entrypoint for the `adm-publish` binary.
//! All pipeline logic lives in [`adm-publish-core`]; this module only turns
//! flags and environment into a [`PipelineConfig`], wires up the S3 store and
//! the HTTP announcer, and reports the outcome.
//!
//! ## How To Use
//! - Command line: `adm-publish [-v VERSION] [-b BUCKET]`, see `--help`.
//! - Programmatic/integration use: call [`run`] with a constructed [`Cli`], or
//!   [`run_with_store`] to supply a different [`ObjectStore`].
//!
//! [`adm-publish-core`]: ../../adm-publish-core/
//! [`PipelineConfig`]: adm_publish_core::config::PipelineConfig

use adm_publish_core::announce::HttpAnnouncer;
use adm_publish_core::config::DEFAULT_BUCKET;
use adm_publish_core::contract::ObjectStore;
use adm_publish_core::pipeline::publish_all;
use anyhow::Result;
use clap::Parser;

use crate::load_config::load_config;
use crate::upload::S3Store;

/// CLI for adm-publish: publish administrative codes and boundary GeoJSON.
#[derive(Parser, Debug)]
#[clap(
    name = "adm-publish",
    about = "Publish administrative codes and boundary GeoJSON to S3 under a version stamp"
)]
pub struct Cli {
    /// Version stamp embedded in the object keys [default: current time, YYYY.MM.DD.HHMMSS]
    #[clap(short = 'v', long)]
    pub version: Option<String>,

    /// Target bucket
    #[clap(short = 'b', long, default_value = DEFAULT_BUCKET)]
    pub bucket: String,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    let store = S3Store::from_env().await;
    run_with_store(cli, &store).await
}

/// Same as [`run`] but writes to the given store.
pub async fn run_with_store<S>(cli: Cli, store: &S) -> Result<()>
where
    S: ObjectStore + ?Sized,
{
    tracing::info!("trace_initialised");
    let config = load_config(&cli)?;
    println!("{:?}", cli);

    let announcer = HttpAnnouncer::new(config.announce.clone())?;

    tracing::info!(command = "publish", version = %config.pipeline.version, "Starting publish");
    println!("Publish starting...");
    match publish_all(&config.pipeline, store, &announcer).await {
        Ok(report) => {
            tracing::info!(command = "publish", ?report, "Publish complete");
            println!("Publish complete.\nReport:");
            println!("{:#?}", report);
            Ok(())
        }
        Err(e) => {
            tracing::error!(command = "publish", error = %e, "Publish failed");
            eprintln!("[ERROR] Publish failed: {}", e);
            Err(anyhow::Error::new(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_version_unset() {
        let cli = Cli::try_parse_from(["adm-publish"]).unwrap();
        assert_eq!(cli.version, None);
        assert_eq!(cli.bucket, "dev-geo-data.everybike.io");
    }

    #[test]
    fn short_flags() {
        let cli = Cli::try_parse_from(["adm-publish", "-v", "2024.06.01", "-b", "prod"]).unwrap();
        assert_eq!(cli.version.as_deref(), Some("2024.06.01"));
        assert_eq!(cli.bucket, "prod");
    }

    #[test]
    fn long_flags() {
        let cli =
            Cli::try_parse_from(["adm-publish", "--version", "v9", "--bucket", "b"]).unwrap();
        assert_eq!(cli.version.as_deref(), Some("v9"));
        assert_eq!(cli.bucket, "b");
    }

    #[test]
    fn rejects_subcommands_and_unknown_flags() {
        assert!(Cli::try_parse_from(["adm-publish", "sync"]).is_err());
        assert!(Cli::try_parse_from(["adm-publish", "--config", "x.yaml"]).is_err());
    }
}
