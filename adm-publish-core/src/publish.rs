//! Writing payloads to the object store under versioned keys.

use serde::Serialize;
use tracing::{error, info};

use crate::contract::{ObjectStore, PutObject, PutReceipt};
use crate::error::{PublishError, Result};

/// Content type set on every published object, GeoJSON included.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Key for the administrative code list of a version.
pub fn adm_codes_key(version: &str) -> String {
    format!("adm/adm_codes_{version}.json")
}

/// Key for the boundary GeoJSON of a version.
pub fn adm_geojson_key(version: &str) -> String {
    format!("adm/adm_geojson_{version}.geojson")
}

/// Where an object lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    pub bucket: String,
    pub key: String,
}

impl PublishTarget {
    pub fn adm_codes(bucket: &str, version: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: adm_codes_key(version),
        }
    }

    pub fn adm_geojson(bucket: &str, version: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: adm_geojson_key(version),
        }
    }
}

/// Outcome of a single write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub receipt: PutReceipt,
    /// Length of the body that was sent.
    pub bytes: usize,
}

/// What gets written.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Serialized to compact JSON before upload. Non-ASCII text is kept as UTF-8.
    Structured(serde_json::Value),
    /// Already-serialized text, uploaded byte for byte.
    Raw(String),
}

impl Payload {
    /// Builds a structured payload from any serializable value.
    pub fn structured<T: Serialize>(value: &T, key: &str) -> Result<Self> {
        serde_json::to_value(value)
            .map(Payload::Structured)
            .map_err(|source| PublishError::Serialize {
                key: key.to_string(),
                source,
            })
    }

    fn into_body(self, key: &str) -> Result<Vec<u8>> {
        match self {
            Payload::Structured(value) => {
                serde_json::to_vec(&value).map_err(|source| PublishError::Serialize {
                    key: key.to_string(),
                    source,
                })
            }
            Payload::Raw(text) => Ok(text.into_bytes()),
        }
    }
}

/// Serializes `payload` and writes it to `target`. Store errors propagate as-is.
pub async fn publish<S>(store: &S, target: &PublishTarget, payload: Payload) -> Result<Published>
where
    S: ObjectStore + ?Sized,
{
    let body = payload.into_body(&target.key)?;
    let size = body.len();
    info!(bucket = %target.bucket, key = %target.key, bytes = size, "[PUBLISH][UPLOAD] Writing object");

    let receipt = store
        .put_object(PutObject {
            bucket: target.bucket.clone(),
            key: target.key.clone(),
            body,
            content_type: JSON_CONTENT_TYPE.to_string(),
        })
        .await
        .map_err(|e| {
            error!(bucket = %target.bucket, key = %target.key, error = %e, "[PUBLISH][ERROR][UPLOAD] put_object failed");
            e
        })?;

    info!(
        bucket = %target.bucket,
        key = %target.key,
        request_id = receipt.request_id.as_deref().unwrap_or("-"),
        e_tag = receipt.e_tag.as_deref().unwrap_or("-"),
        "[PUBLISH][UPLOAD] put_object succeeded"
    );
    Ok(Published {
        receipt,
        bytes: size,
    })
}
