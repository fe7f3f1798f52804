use lambda_runtime::{run, service_fn, tracing, Error};

mod config;
mod event_handler;
mod fleet;
mod ride_id;

use config::Config;
use event_handler::{function_handler, Services};
use fleet::FleetClient;
use ride_id::RideIdGenerator;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env()?;

    tracing::subscriber::fmt()
        .with_max_level(config.log_level)
        // CloudWatch adds the ingestion time.
        .without_time()
        .with_target(false)
        .init();

    let services = Services {
        fleet: FleetClient::new(reqwest::Client::new(), config.request_unicorn_url),
        ride_ids: RideIdGenerator::new(),
    };

    run(service_fn(|event| function_handler(&services, event))).await
}
