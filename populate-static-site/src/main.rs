use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, tracing, Error};

mod assets;
mod config;
mod event_handler;
mod store;

use config::Config;
use event_handler::{function_handler, Services};
use store::S3AssetStore;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env()?;

    tracing::subscriber::fmt()
        .with_max_level(config.log_level)
        // CloudWatch adds the ingestion time.
        .without_time()
        .with_target(false)
        .init();

    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let services = Services {
        store: S3AssetStore::new(aws_sdk_s3::Client::new(&sdk_config)),
        bucket: config.bucket_name,
        site_source: config.site_source,
        key_prefix: config.key_prefix,
    };

    run(service_fn(|event| function_handler(&services, event))).await
}
