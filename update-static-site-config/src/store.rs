use anyhow::Context;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

/// Object storage holding the published site configuration.
pub(crate) trait ConfigStore {
    async fn put_config(&self, bucket: &str, key: &str, body: String) -> anyhow::Result<()>;

    async fn delete_config(&self, bucket: &str, key: &str) -> anyhow::Result<()>;
}

pub(crate) struct S3ConfigStore {
    client: Client,
}

impl S3ConfigStore {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ConfigStore for S3ConfigStore {
    async fn put_config(&self, bucket: &str, key: &str, body: String) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body.into_bytes()))
            .send()
            .await
            .with_context(|| format!("failed to write s3://{bucket}/{key}"))?;

        Ok(())
    }

    // S3 reports success for keys that do not exist.
    async fn delete_config(&self, bucket: &str, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("failed to delete s3://{bucket}/{key}"))?;

        Ok(())
    }
}
