//! High-level pipeline: orchestrates locate → transform → publish → announce.
//!
//! One run publishes two artifacts for a single version and then tells the
//! downstream API about it:
//!   - The newest administrative code table (`.tsv`), reduced to `{code, name}`
//!     records and written as `adm/adm_codes_{version}.json`
//!   - The newest boundary file (`.geojson`), written verbatim as
//!     `adm/adm_geojson_{version}.geojson`
//!   - A version announcement through the [`Announcer`], when enabled
//!
//! # Responsibilities
//! - Strictly sequential, fail-fast orchestration: the first error stops the run
//! - No rollback: artifacts written before a failure stay published
//! - A missing source file is an error ([`PublishError::SourceNotFound`]), raised
//!   before anything is written for that step
//!
//! # Navigation
//! - Main entrypoint: [`publish_all`]
//! - Supporting types: [`PipelineConfig`], [`PublishReport`].

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::contract::{Announcement, Announcer, ObjectStore, PutReceipt};
use crate::error::{PublishError, Result};
use crate::locate::{locate_latest, DescendingName, SelectionPolicy, SourceKind};
use crate::publish::{publish, Payload, PublishTarget};
use crate::transform::{read_tsv, to_adm_codes};

/// Summary of a completed run.
#[derive(Debug)]
pub struct PublishReport {
    pub version: String,
    pub artifacts: Vec<PublishedArtifact>,
    /// `None` when the announcement step is disabled.
    pub announcement: Option<Announcement>,
}

#[derive(Debug)]
pub struct PublishedArtifact {
    pub source: PathBuf,
    pub target: PublishTarget,
    pub receipt: PutReceipt,
    /// Size of the uploaded body.
    pub bytes: usize,
}

/// Runs the full pipeline with the default descending-name file selection.
pub async fn publish_all<S, A>(
    config: &PipelineConfig,
    store: &S,
    announcer: &A,
) -> Result<PublishReport>
where
    S: ObjectStore + ?Sized,
    A: Announcer + ?Sized,
{
    publish_all_with_policy(config, store, announcer, &DescendingName).await
}

pub async fn publish_all_with_policy<S, A>(
    config: &PipelineConfig,
    store: &S,
    announcer: &A,
    policy: &dyn SelectionPolicy,
) -> Result<PublishReport>
where
    S: ObjectStore + ?Sized,
    A: Announcer + ?Sized,
{
    info!(version = %config.version, bucket = %config.bucket, "[PUBLISH] Starting publish pipeline");
    let mut artifacts = Vec::with_capacity(2);

    // --- Step 1: administrative codes ---
    artifacts.push(publish_adm_codes(config, store, policy).await?);

    // --- Step 2: boundary GeoJSON ---
    artifacts.push(publish_adm_geojson(config, store, policy).await?);

    // --- Step 3: announce ---
    let announcement = if config.announce_version {
        let outcome = announcer.announce(&config.version).await.map_err(|e| {
            error!(version = %config.version, error = %e, "[PUBLISH][ERROR][ANNOUNCE] Announcement failed");
            e
        })?;
        println!("announcement: {outcome:?}");
        Some(outcome)
    } else {
        info!("[PUBLISH] Version announcement disabled");
        None
    };

    info!(version = %config.version, artifacts = artifacts.len(), "[PUBLISH] Publish pipeline complete");
    Ok(PublishReport {
        version: config.version.clone(),
        artifacts,
        announcement,
    })
}

async fn publish_adm_codes<S>(
    config: &PipelineConfig,
    store: &S,
    policy: &dyn SelectionPolicy,
) -> Result<PublishedArtifact>
where
    S: ObjectStore + ?Sized,
{
    let source = require_source(&config.adm_code_dir, SourceKind::AdmCodeTable, policy)?;
    println!("adm code file: {} (version {})", source.display(), config.version);

    let rows = read_tsv(&source)?;
    let codes = to_adm_codes(&rows)?;
    info!(path = %source.display(), records = codes.len(), "[PUBLISH] Transformed administrative codes");

    let target = PublishTarget::adm_codes(&config.bucket, &config.version);
    let payload = Payload::structured(&codes, &target.key)?;
    finish(source, target, payload, store).await
}

async fn publish_adm_geojson<S>(
    config: &PipelineConfig,
    store: &S,
    policy: &dyn SelectionPolicy,
) -> Result<PublishedArtifact>
where
    S: ObjectStore + ?Sized,
{
    let source = require_source(&config.geojson_root, SourceKind::BoundaryGeoJson, policy)?;
    println!("geojson file: {}", source.display());

    let text = fs::read_to_string(&source).map_err(|e| {
        error!(path = %source.display(), error = ?e, "[PUBLISH][ERROR] Failed to read GeoJSON file");
        PublishError::FileAccess {
            path: source.clone(),
            source: e,
        }
    })?;

    let target = PublishTarget::adm_geojson(&config.bucket, &config.version);
    finish(source, target, Payload::Raw(text), store).await
}

async fn finish<S>(
    source: PathBuf,
    target: PublishTarget,
    payload: Payload,
    store: &S,
) -> Result<PublishedArtifact>
where
    S: ObjectStore + ?Sized,
{
    let published = publish(store, &target, payload).await?;
    println!(
        "result: {}/{} ({} bytes) {:?}",
        target.bucket, target.key, published.bytes, published.receipt
    );
    Ok(PublishedArtifact {
        source,
        target,
        receipt: published.receipt,
        bytes: published.bytes,
    })
}

fn require_source(
    root: &Path,
    kind: SourceKind,
    policy: &dyn SelectionPolicy,
) -> Result<PathBuf> {
    locate_latest(root, kind, policy)?.ok_or_else(|| {
        error!(root = %root.display(), %kind, "[PUBLISH][ERROR] No source file found");
        PublishError::SourceNotFound {
            kind,
            root: root.to_path_buf(),
        }
    })
}
