use anyhow::Context;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

/// Bucket the static site is served from.
pub(crate) trait AssetStore {
    async fn put_asset(&self, bucket: &str, key: &str, body: Vec<u8>) -> anyhow::Result<()>;
}

pub(crate) struct S3AssetStore {
    client: Client,
}

impl S3AssetStore {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }
}

impl AssetStore for S3AssetStore {
    async fn put_asset(&self, bucket: &str, key: &str, body: Vec<u8>) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .with_context(|| format!("failed to write s3://{bucket}/{key}"))?;

        Ok(())
    }
}
