use aws_config::BehaviorVersion;
use aws_sdk_lambda::Client;
use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::Instant;

#[derive(Default)]
struct Stats {
    success_count: usize,
    error_count: usize,
    total_latency_ms: f64,
    ride_ids: HashSet<String>,
    duplicate_count: usize,
}

impl Stats {
    fn record_ride(&mut self, ride_id: String, latency_ms: f64) {
        self.success_count += 1;
        self.total_latency_ms += latency_ms;
        if !self.ride_ids.insert(ride_id) {
            self.duplicate_count += 1;
        }
    }
}

/// Proxy-format response returned by the ride function.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProxyResponse {
    status_code: u16,
    body: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Ride {
    ride_id: String,
}

#[derive(Parser, Debug)]
#[command(name = "invoke-test")]
#[command(about = "Request rides from the deployed ride function with random pickup locations")]
struct Args {
    /// Lambda function name
    function: String,

    /// Number of iterations to run
    #[arg(long, default_value = "100")]
    iters: usize,

    /// Number of parallel threads
    #[arg(long, default_value = "1")]
    threads: usize,
}

/// Random point in central Seattle.
fn random_pickup(rng: &mut impl Rng) -> (f64, f64) {
    (rng.gen_range(47.55..=47.70), rng.gen_range(-122.40..=-122.25))
}

fn ride_event(latitude: f64, longitude: f64) -> serde_json::Value {
    let body = serde_json::json!({
        "PickupLocation": {
            "Latitude": latitude,
            "Longitude": longitude
        }
    });

    serde_json::json!({ "body": body.to_string() })
}

/// Returns the ride id of a successful (201) response.
fn parse_ride(payload: &str) -> Option<String> {
    let response: ProxyResponse = serde_json::from_str(payload).ok()?;
    if response.status_code != 201 {
        return None;
    }

    let ride: Ride = serde_json::from_str(&response.body).ok()?;
    Some(ride.ride_id)
}

async fn run_invocations(
    client: Arc<Client>,
    function_name: String,
    thread_id: usize,
    start: usize,
    end: usize,
    total: usize,
    stats: Arc<Mutex<Stats>>,
) {
    let mut rng = StdRng::from_entropy();

    for i in start..=end {
        let (latitude, longitude) = random_pickup(&mut rng);
        let payload = ride_event(latitude, longitude);

        let started = Instant::now();
        let result = client
            .invoke()
            .function_name(&function_name)
            .payload(aws_sdk_lambda::primitives::Blob::new(payload.to_string()))
            .send()
            .await;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(response) => {
                let response_payload = response
                    .payload()
                    .map(|b| String::from_utf8_lossy(b.as_ref()).to_string())
                    .unwrap_or_else(|| "No response".to_string());

                {
                    let mut stats = stats.lock().await;
                    match parse_ride(&response_payload) {
                        Some(ride_id) => stats.record_ride(ride_id, latency_ms),
                        None => stats.error_count += 1,
                    }
                }

                println!(
                    "[Thread {}: {}/{}] Pickup at ({:.5}, {:.5}) => {}",
                    thread_id, i, total, latitude, longitude, response_payload
                );
            }
            Err(e) => {
                {
                    let mut stats = stats.lock().await;
                    stats.error_count += 1;
                }

                eprintln!(
                    "[Thread {}: {}/{}] Error requesting ride at ({:.5}, {:.5}): {}",
                    thread_id, i, total, latitude, longitude, e
                );
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let threads = args.threads.max(1);

    println!(
        "Running {} invocations across {} thread(s)",
        args.iters, threads
    );

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let client = Arc::new(Client::new(&config));

    let stats = Arc::new(Mutex::new(Stats::default()));

    let iters_per_thread = args.iters / threads;
    let remainder = args.iters % threads;

    let mut tasks = JoinSet::new();

    let total_iters = args.iters;

    let mut start = 1;
    for t in 1..=threads {
        let end = if t == threads {
            start + iters_per_thread - 1 + remainder
        } else {
            start + iters_per_thread - 1
        };

        let client = Arc::clone(&client);
        let function_name = args.function.clone();
        let stats = Arc::clone(&stats);

        tasks.spawn(async move {
            run_invocations(client, function_name, t, start, end, total_iters, stats).await;
        });

        start = end + 1;
    }

    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            eprintln!("Task failed: {}", e);
        }
    }

    let stats = stats.lock().await;
    println!("Completed {} invocations", args.iters);
    println!();
    println!("Results:");
    println!("  Success: {}", stats.success_count);
    println!("  Errors:  {}", stats.error_count);
    println!("  Duplicate ride ids: {}", stats.duplicate_count);
    if stats.success_count > 0 {
        let avg_latency = stats.total_latency_ms / stats.success_count as f64;
        println!("  Avg latency: {:.3}ms", avg_latency);
    }
}
