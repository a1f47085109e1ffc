//! `load_config` module: merges command-line flags and environment variables into
//! the [`PipelineConfig`] and [`AnnounceConfig`] used for one run.
//!
//! This is the only place pipeline settings are read from the environment. Everything downstream
//! receives explicit configuration.
//!
//! # Environment
//! - `API_URL`, `API_KEY`: announcement endpoint and key. Either one unset (or
//!   empty) disables the announcement without error.
//! - `ADM_CODE_DIR`: directory holding the `.tsv` code tables.
//! - `GEOJSON_ROOT`: directory searched recursively for `.geojson`.
//! - `ANNOUNCE_VERSION`: `false`, `0`, `no` or `off` turns the announcement step off.
//!
//! # Errors
//! All errors use `anyhow::Error` and are surfaced at the CLI boundary.

use std::env;
use std::path::PathBuf;

use adm_publish_core::announce::AnnounceConfig;
use adm_publish_core::config::{
    default_version, PipelineConfig, DEFAULT_ADM_CODE_DIR, DEFAULT_GEOJSON_ROOT,
};
use anyhow::Result;
use tracing::{error, info};

use crate::cli::Cli;

pub const API_URL_VAR: &str = "API_URL";
pub const API_KEY_VAR: &str = "API_KEY";
pub const ADM_CODE_DIR_VAR: &str = "ADM_CODE_DIR";
pub const GEOJSON_ROOT_VAR: &str = "GEOJSON_ROOT";
pub const ANNOUNCE_VERSION_VAR: &str = "ANNOUNCE_VERSION";

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub pipeline: PipelineConfig,
    pub announce: AnnounceConfig,
}

/// Resolves flags and environment into a [`RunConfig`].
pub fn load_config(cli: &Cli) -> Result<RunConfig> {
    let version = match &cli.version {
        Some(v) => {
            info!(version = %v, "Using version from command line");
            v.clone()
        }
        None => {
            let v = default_version();
            info!(version = %v, "No version given, using current timestamp");
            v
        }
    };

    let pipeline = PipelineConfig {
        version,
        bucket: cli.bucket.clone(),
        adm_code_dir: env_path(ADM_CODE_DIR_VAR, DEFAULT_ADM_CODE_DIR),
        geojson_root: env_path(GEOJSON_ROOT_VAR, DEFAULT_GEOJSON_ROOT),
        announce_version: announce_enabled()?,
    };
    pipeline.trace_loaded();

    let announce = AnnounceConfig {
        endpoint_url: non_empty_var(API_URL_VAR),
        api_key: non_empty_var(API_KEY_VAR),
    };
    announce.trace_loaded();

    Ok(RunConfig { pipeline, announce })
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_path(name: &str, default: &str) -> PathBuf {
    non_empty_var(name)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

fn announce_enabled() -> Result<bool> {
    let Some(raw) = non_empty_var(ANNOUNCE_VERSION_VAR) else {
        return Ok(true);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => {
            error!(value = %other, "ANNOUNCE_VERSION must be a boolean");
            anyhow::bail!("ANNOUNCE_VERSION must be a boolean, got {:?}", other)
        }
    }
}
