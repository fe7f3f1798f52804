use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

/// 100ns ticks between the UUID epoch (1582-10-15) and the UNIX epoch.
pub(crate) const GREGORIAN_OFFSET_TICKS: u64 = 0x01B2_1DD2_1381_4000;

/// Length of one UUID clock tick in nanoseconds.
pub(crate) const TICK_NANOS: i64 = 100;

pub(crate) const NANOS_PER_SECOND: f64 = 1e9;

const MICROS_PER_SECOND: f64 = 1e6;

/// Generates version 1 ride ids.
///
/// The node id is random and picked once per process, with the multicast
/// bit set so it can never collide with a real MAC address.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RideIdGenerator {
    node_id: [u8; 6],
}

impl RideIdGenerator {
    pub(crate) fn new() -> Self {
        let mut node_id = [0u8; 6];
        rand::thread_rng().fill(&mut node_id[..]);
        node_id[0] |= 0x01;

        Self { node_id }
    }

    pub(crate) fn generate(&self) -> Uuid {
        Uuid::now_v1(&self.node_id)
    }
}

/// Returns the 60-bit clock value embedded in a time-based UUID.
pub(crate) fn clock_ticks(id: &Uuid) -> u64 {
    let (time_low, time_mid, time_hi_and_version, _) = id.as_fields();

    (u64::from(time_hi_and_version & 0x0FFF) << 48)
        | (u64::from(time_mid) << 32)
        | u64::from(time_low)
}

/// Converts a UUID clock value into wall-clock time.
///
/// Seconds are `ticks * TICK_NANOS / NANOS_PER_SECOND` as a float, then
/// split into whole seconds and microseconds rounded half-to-even, the same
/// steps a float UNIX timestamp goes through in Python's `fromtimestamp`.
pub(crate) fn request_time(ticks: u64) -> Option<DateTime<Utc>> {
    let since_epoch = i64::try_from(ticks).ok()? - i64::try_from(GREGORIAN_OFFSET_TICKS).ok()?;
    let seconds = since_epoch.checked_mul(TICK_NANOS)? as f64 / NANOS_PER_SECOND;

    let mut whole = seconds.trunc();
    let mut micros = ((seconds - whole) * MICROS_PER_SECOND).round_ties_even();
    if micros >= MICROS_PER_SECOND {
        micros -= MICROS_PER_SECOND;
        whole += 1.0;
    } else if micros < 0.0 {
        micros += MICROS_PER_SECOND;
        whole -= 1.0;
    }

    DateTime::from_timestamp(whole as i64, micros as u32 * 1_000)
}

/// Renders a request time as `YYYY-MM-DD HH:MM:SS[.ffffff]`.
///
/// `request_time` only produces whole microseconds, so `%.6f` is exact.
pub(crate) fn format_request_time(time: &DateTime<Utc>) -> String {
    if time.timestamp_subsec_micros() == 0 {
        time.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        time.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}
