use std::collections::HashMap;

use lambda_runtime::{tracing, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fleet::FleetClient;
use crate::ride_id::{clock_ticks, format_request_time, request_time, RideIdGenerator};

/// API Gateway proxy event. Only the body is used.
#[derive(Deserialize, Debug)]
pub struct Request {
    body: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct Ride {
    ride_id: String,
    unicorn: Value,
    request_time: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    status_code: u16,
    body: String,
    headers: HashMap<String, String>,
}

/// Long-lived dependencies, built once at cold start.
pub(crate) struct Services {
    pub(crate) fleet: FleetClient,
    pub(crate) ride_ids: RideIdGenerator,
}

/// Reads `PickupLocation` from the request body, which must be a JSON object.
fn pickup_location(body: &str) -> Result<Option<Value>, Error> {
    match serde_json::from_str::<Value>(body)? {
        Value::Object(mut fields) => Ok(fields.remove("PickupLocation")),
        _ => Err("Request body must be a JSON object".into()),
    }
}

async fn get_ride(services: &Services) -> Result<Ride, Error> {
    let ride_id = services.ride_ids.generate();
    let unicorn = services.fleet.request_unicorn().await?;

    let time = request_time(clock_ticks(&ride_id))
        .ok_or_else(|| format!("Ride id {ride_id} has an out of range timestamp"))?;

    Ok(Ride {
        ride_id: ride_id.to_string(),
        unicorn,
        request_time: format_request_time(&time),
    })
}

pub(crate) async fn function_handler(
    services: &Services,
    event: LambdaEvent<Request>,
) -> Result<Response, Error> {
    tracing::info!(request = ?event.payload, "Request");

    let body = event.payload.body.ok_or("Request has no body")?;
    let pickup_location = pickup_location(&body)?;

    // The fleet service picks a unicorn without knowing where the rider is.
    tracing::debug!(?pickup_location, "Pickup location");

    let ride = get_ride(services).await?;

    let response = Response {
        status_code: 201,
        body: serde_json::to_string(&ride)?,
        headers: HashMap::from([("Access-Control-Allow-Origin".to_string(), "*".to_string())]),
    };

    tracing::info!(response = ?response, "Response");
    Ok(response)
}
