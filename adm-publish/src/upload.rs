#![doc = "Object store integration for the CLI: implements the core `ObjectStore` trait on top of the AWS S3 SDK."]
//
//! # S3 Store (CLI <-> Core)
//!
//! - Construct [`S3Store`] with [`S3Store::from_env`]; region, credentials and
//!   endpoint come from the standard AWS environment/profile chain
//!   (`AWS_REGION`, `AWS_ACCESS_KEY_ID`, `AWS_ENDPOINT_URL`, ...).
//! - Every SDK failure becomes [`PublishError::Storage`] carrying bucket and key.

use adm_publish_core::contract::{ObjectStore, PutObject, PutReceipt, StoredObject};
use adm_publish_core::error::{PublishError, Result};
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::RequestId;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::load_from_env().await;
        tracing::info!(
            region = ?sdk_config.region(),
            "Initialized S3 client from environment"
        );
        S3Store {
            client: Client::new(&sdk_config),
        }
    }

    pub fn new(client: Client) -> Self {
        S3Store { client }
    }
}

fn storage_error(bucket: &str, key: &str, message: String) -> PublishError {
    PublishError::Storage {
        bucket: bucket.to_string(),
        key: key.to_string(),
        message,
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(&self, req: PutObject) -> Result<PutReceipt> {
        let PutObject {
            bucket,
            key,
            body,
            content_type,
        } = req;
        tracing::info!(bucket = %bucket, key = %key, bytes = body.len(), "Uploading object to S3");

        let result = self
            .client
            .put_object()
            .bucket(&bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await;

        match result {
            Ok(out) => {
                tracing::info!(
                    bucket = %bucket,
                    key = %key,
                    request_id = out.request_id().unwrap_or("-"),
                    e_tag = out.e_tag().unwrap_or("-"),
                    "Successfully uploaded object"
                );
                Ok(PutReceipt {
                    request_id: out.request_id().map(str::to_string),
                    e_tag: out.e_tag().map(str::to_string),
                    version_id: out.version_id().map(str::to_string),
                })
            }
            Err(e) => {
                tracing::error!(bucket = %bucket, key = %key, error = %DisplayErrorContext(&e), "S3 rejected upload");
                Err(storage_error(
                    &bucket,
                    &key,
                    DisplayErrorContext(&e).to_string(),
                ))
            }
        }
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<StoredObject> {
        tracing::info!(bucket, key, "Fetching object from S3");
        let out = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(bucket, key, error = %DisplayErrorContext(&e), "Failed to fetch object");
                storage_error(bucket, key, DisplayErrorContext(&e).to_string())
            })?;

        let content_type = out.content_type().map(str::to_string);
        let body = out
            .body
            .collect()
            .await
            .map_err(|e| {
                tracing::error!(bucket, key, error = ?e, "Failed to read object body");
                storage_error(bucket, key, e.to_string())
            })?
            .into_bytes()
            .to_vec();

        Ok(StoredObject { body, content_type })
    }
}
