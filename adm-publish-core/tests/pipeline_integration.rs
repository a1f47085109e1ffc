use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Mutex};

use adm_publish_core::config::PipelineConfig;
use adm_publish_core::contract::{
    Announcement, MockAnnouncer, MockObjectStore, ObjectStore, PutObject, PutReceipt,
    StoredObject,
};
use adm_publish_core::error::PublishError;
use adm_publish_core::locate::SourceKind;
use adm_publish_core::pipeline::publish_all;
use adm_publish_core::publish::{publish, Payload, PublishTarget};
use adm_publish_core::Result;
use async_trait::async_trait;
use serde_json::json;
use tempfile::{tempdir, TempDir};

/// Object store kept in memory so published bytes can be read back.
#[derive(Default)]
struct MemoryStore {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, req: PutObject) -> Result<PutReceipt> {
        self.objects.lock().unwrap().insert(
            (req.bucket, req.key),
            StoredObject {
                body: req.body,
                content_type: Some(req.content_type),
            },
        );
        Ok(PutReceipt {
            request_id: Some("mem-1".into()),
            ..PutReceipt::default()
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| PublishError::Storage {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: "NoSuchKey".into(),
            })
    }
}

const GEOJSON: &str = "{\"type\":\"FeatureCollection\",\"features\":[]}\n";

/// Lays out `data/20240601.tsv` and `geo/boundary.geojson` under a temp dir.
fn workspace(tsv: Option<&str>) -> (TempDir, PipelineConfig) {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    let geo = dir.path().join("geo");
    fs::create_dir_all(&data).unwrap();
    fs::create_dir_all(&geo).unwrap();
    if let Some(contents) = tsv {
        fs::write(data.join("20240601.tsv"), contents).unwrap();
    }
    fs::write(geo.join("boundary.geojson"), GEOJSON).unwrap();

    let mut config = PipelineConfig::new("2024.06.01");
    config.bucket = "test-bucket".into();
    config.adm_code_dir = data;
    config.geojson_root = geo;
    (dir, config)
}

fn skipping_announcer() -> MockAnnouncer {
    let mut announcer = MockAnnouncer::new();
    announcer
        .expect_announce()
        .returning(|_| Ok(Announcement::Skipped));
    announcer
}

#[tokio::test]
async fn publishes_adm_codes_under_versioned_key() {
    let (_dir, config) = workspace(Some("ADMCD\tADMNM\n11010\tJongno-gu\n"));
    let store = MemoryStore::default();

    let report = publish_all(&config, &store, &skipping_announcer())
        .await
        .expect("pipeline should succeed");

    let codes = store
        .get_object("test-bucket", "adm/adm_codes_2024.06.01.json")
        .await
        .unwrap();
    assert_eq!(
        String::from_utf8(codes.body).unwrap(),
        r#"[{"code":"11010","name":"Jongno-gu"}]"#
    );
    assert_eq!(
        codes.content_type.as_deref(),
        Some("application/json; charset=utf-8")
    );

    let geojson = store
        .get_object("test-bucket", "adm/adm_geojson_2024.06.01.geojson")
        .await
        .unwrap();
    assert_eq!(geojson.body, GEOJSON.as_bytes());
    assert_eq!(
        geojson.content_type.as_deref(),
        Some("application/json; charset=utf-8")
    );

    assert_eq!(report.artifacts.len(), 2);
    assert_eq!(report.artifacts[0].bytes, 37);
    assert_eq!(report.artifacts[1].bytes, GEOJSON.len());
    assert_eq!(report.announcement, Some(Announcement::Skipped));
}

#[tokio::test]
async fn preserves_row_order_and_duplicates() {
    let (_dir, config) = workspace(Some(
        "ADMCD\tADMNM\tEXTRA\n2\tB\tx\n1\tA\ty\n2\tB\tz\n",
    ));
    let store = MemoryStore::default();

    publish_all(&config, &store, &skipping_announcer())
        .await
        .unwrap();

    let body = store
        .get_object("test-bucket", "adm/adm_codes_2024.06.01.json")
        .await
        .unwrap()
        .body;
    let published: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        published,
        json!([
            {"code": "2", "name": "B"},
            {"code": "1", "name": "A"},
            {"code": "2", "name": "B"}
        ])
    );
}

#[tokio::test]
async fn picks_greatest_tsv_name() {
    let (dir, config) = workspace(Some("ADMCD\tADMNM\n1\told\n"));
    fs::write(
        dir.path().join("data").join("20240701.tsv"),
        "ADMCD\tADMNM\n1\tnew\n",
    )
    .unwrap();
    let store = MemoryStore::default();

    let report = publish_all(&config, &store, &skipping_announcer())
        .await
        .unwrap();

    assert!(report.artifacts[0].source.ends_with("20240701.tsv"));
    let body = store
        .get_object("test-bucket", "adm/adm_codes_2024.06.01.json")
        .await
        .unwrap()
        .body;
    assert_eq!(body, br#"[{"code":"1","name":"new"}]"#);
}

#[tokio::test]
async fn missing_tsv_fails_before_any_upload() {
    let (_dir, config) = workspace(None);
    let mut store = MockObjectStore::new();
    store.expect_put_object().never();
    let mut announcer = MockAnnouncer::new();
    announcer.expect_announce().never();

    let err = publish_all(&config, &store, &announcer)
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            PublishError::SourceNotFound {
                kind: SourceKind::AdmCodeTable,
                ..
            }
        ),
        "got {err:?}"
    );
}

#[tokio::test]
async fn missing_column_fails_before_any_upload() {
    let (_dir, config) = workspace(Some("CODE\tADMNM\n11010\tJongno-gu\n"));
    let mut store = MockObjectStore::new();
    store.expect_put_object().never();
    let mut announcer = MockAnnouncer::new();
    announcer.expect_announce().never();

    let err = publish_all(&config, &store, &announcer)
        .await
        .unwrap_err();

    assert!(
        matches!(err, PublishError::MissingField { row: 1, field: "ADMCD" }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn storage_failure_aborts_remaining_steps() {
    let (_dir, config) = workspace(Some("ADMCD\tADMNM\n11010\tJongno-gu\n"));
    let mut store = MockObjectStore::new();
    store.expect_put_object().times(1).returning(|req| {
        Err(PublishError::Storage {
            bucket: req.bucket,
            key: req.key,
            message: "NoSuchBucket".into(),
        })
    });
    let mut announcer = MockAnnouncer::new();
    announcer.expect_announce().never();

    let err = publish_all(&config, &store, &announcer)
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::Storage { .. }));
}

#[tokio::test]
async fn announcement_failure_leaves_artifacts_published() {
    let (_dir, config) = workspace(Some("ADMCD\tADMNM\n11010\tJongno-gu\n"));
    let store = MemoryStore::default();
    let mut announcer = MockAnnouncer::new();
    announcer
        .expect_announce()
        .withf(|version| version == "2024.06.01")
        .times(1)
        .returning(|_| {
            Err(PublishError::Announcement(
                "remote responded with 500 Internal Server Error".into(),
            ))
        });

    let err = publish_all(&config, &store, &announcer)
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::Announcement(_)));

    // no rollback
    assert!(store
        .get_object("test-bucket", "adm/adm_codes_2024.06.01.json")
        .await
        .is_ok());
    assert!(store
        .get_object("test-bucket", "adm/adm_geojson_2024.06.01.geojson")
        .await
        .is_ok());
}

#[tokio::test]
async fn disabled_announcement_is_never_called() {
    let (_dir, mut config) = workspace(Some("ADMCD\tADMNM\n11010\tJongno-gu\n"));
    config.announce_version = false;
    let store = MemoryStore::default();
    let mut announcer = MockAnnouncer::new();
    announcer.expect_announce().never();

    let report = publish_all(&config, &store, &announcer).await.unwrap();
    assert_eq!(report.announcement, None);
}

#[tokio::test]
async fn writes_happen_in_order_codes_then_geojson() {
    let (_dir, config) = workspace(Some("ADMCD\tADMNM\n11010\tJongno-gu\n"));
    let keys = Arc::new(Mutex::new(Vec::new()));
    let seen = keys.clone();
    let mut store = MockObjectStore::new();
    store.expect_put_object().times(2).returning(move |req| {
        seen.lock().unwrap().push(req.key);
        Ok(PutReceipt::default())
    });

    publish_all(&config, &store, &skipping_announcer())
        .await
        .unwrap();

    assert_eq!(
        *keys.lock().unwrap(),
        vec![
            "adm/adm_codes_2024.06.01.json".to_string(),
            "adm/adm_geojson_2024.06.01.geojson".to_string()
        ]
    );
}

#[tokio::test]
async fn structured_payload_round_trips() {
    let store = MemoryStore::default();
    let original = json!([
        {"code": "11010", "name": "종로구"},
        {"code": "11020", "name": "중구"}
    ]);
    let target = PublishTarget::adm_codes("round-trip", "v1");

    publish(&store, &target, Payload::Structured(original.clone()))
        .await
        .unwrap();

    let stored = store.get_object("round-trip", &target.key).await.unwrap();
    let read_back: serde_json::Value = serde_json::from_slice(&stored.body).unwrap();
    assert_eq!(read_back, original);
    // UTF-8 is written as-is, not \u-escaped
    assert!(String::from_utf8(stored.body).unwrap().contains("종로구"));
}
