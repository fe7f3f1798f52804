use anyhow::Context;
use lambda_runtime::{tracing, Error, LambdaEvent};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

use crate::assets::{collect_assets, Asset};
use crate::store::AssetStore;

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct Response {
    bucket: String,
    uploaded: Vec<String>,
}

/// Long-lived dependencies and settings, built once at cold start.
pub(crate) struct Services<S> {
    pub(crate) store: S,
    pub(crate) bucket: String,
    pub(crate) site_source: PathBuf,
    pub(crate) key_prefix: String,
}

async fn upload<S: AssetStore>(store: &S, bucket: &str, asset: &Asset) -> anyhow::Result<()> {
    let body = tokio::fs::read(&asset.path)
        .await
        .with_context(|| format!("cannot read {}", asset.path.display()))?;

    store.put_asset(bucket, &asset.key, body).await
}

/// Uploads every asset, then fails if any of them could not be written.
pub(crate) async fn function_handler<S: AssetStore>(
    services: &Services<S>,
    event: LambdaEvent<Value>,
) -> Result<Response, Error> {
    tracing::info!(event = %event.payload, "Populate event");

    let assets = collect_assets(&services.site_source, &services.key_prefix).await?;
    let total = assets.len();

    let mut uploaded = Vec::with_capacity(total);
    let mut failed = Vec::new();
    for asset in assets {
        match upload(&services.store, &services.bucket, &asset).await {
            Ok(()) => {
                tracing::info!(key = %asset.key, "Uploaded");
                uploaded.push(asset.key);
            }
            Err(error) => {
                tracing::error!(key = %asset.key, ?error, "Upload failed");
                failed.push(asset.key);
            }
        }
    }

    if !failed.is_empty() {
        return Err(format!(
            "failed to upload {} of {} files to {}: {}",
            failed.len(),
            total,
            services.bucket,
            failed.join(", ")
        )
        .into());
    }

    Ok(Response {
        bucket: services.bucket.clone(),
        uploaded,
    })
}
