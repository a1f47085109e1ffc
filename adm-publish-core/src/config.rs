use std::path::PathBuf;

use chrono::{DateTime, Local, TimeZone};
use tracing::{debug, info};

/// Bucket used when none is given on the command line.
pub const DEFAULT_BUCKET: &str = "dev-geo-data.everybike.io";

/// Directory holding the administrative code tables.
pub const DEFAULT_ADM_CODE_DIR: &str = "./통계청MDIS인구용_행정경계중심점";

/// Root searched recursively for boundary GeoJSON.
pub const DEFAULT_GEOJSON_ROOT: &str = ".";

/// `strftime` layout of generated version stamps.
pub const VERSION_FORMAT: &str = "%Y.%m.%d.%H%M%S";

/// Formats a timestamp as a version stamp, e.g. `2024.06.01.134502`.
pub fn version_from_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(VERSION_FORMAT).to_string()
}

/// Version stamp for the current local time.
pub fn default_version() -> String {
    version_from_timestamp(&Local::now())
}

/// Everything one publish run needs, resolved up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub version: String,
    pub bucket: String,
    pub adm_code_dir: PathBuf,
    pub geojson_root: PathBuf,
    /// Whether the final announcement step runs at all.
    pub announce_version: bool,
}

impl PipelineConfig {
    /// Defaults for everything except the version.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            bucket: DEFAULT_BUCKET.to_string(),
            adm_code_dir: PathBuf::from(DEFAULT_ADM_CODE_DIR),
            geojson_root: PathBuf::from(DEFAULT_GEOJSON_ROOT),
            announce_version: true,
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            version = %self.version,
            bucket = %self.bucket,
            adm_code_dir = %self.adm_code_dir.display(),
            geojson_root = %self.geojson_root.display(),
            announce_version = self.announce_version,
            "Loaded PipelineConfig"
        );
        debug!(?self, "PipelineConfig loaded (full debug)");
    }
}
