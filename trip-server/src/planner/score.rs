//! Connection scoring.
//!
//! Lower scores are better. A score combines the connection's duration,
//! the idle time it leaves before the deadline and the trip to its
//! departure station, all on a log scale, multiplied by the number of legs.

use chrono::{DateTime, Duration, Utc};

use crate::domain::Connection;

/// Buffer left before `deadline` once the traveller has covered the
/// last stretch from the arrival station. Negative means too late; `None`
/// when the buffer falls outside the representable range.
pub fn too_early(
    deadline: DateTime<Utc>,
    arrival: DateTime<Utc>,
    last_mile: Duration,
) -> Option<Duration> {
    (deadline - arrival).checked_sub(&last_mile)
}

/// Score a connection.
///
/// `first_mile` is the travel time to the departure station and
/// `last_mile` the travel time from the arrival station to the final
/// destination. Each logarithmic term is floored at `floor_secs`.
/// Connections that miss the deadline, or whose buffer cannot be computed,
/// score `f64::INFINITY`.
pub fn score(
    connection: &Connection,
    first_mile: Duration,
    last_mile: Duration,
    deadline: DateTime<Utc>,
    floor_secs: f64,
) -> f64 {
    let Some(margin) = too_early(deadline, connection.arrival.time, last_mile)
        .filter(|margin| *margin >= Duration::zero())
    else {
        return f64::INFINITY;
    };

    let ln = |d: Duration| (d.num_seconds() as f64).max(floor_secs).ln();
    let legs = f64::from(connection.vias) + 1.0;

    (ln(connection.duration) + ln(margin) + ln(first_mile)) * legs
}

/// Pick the connection departing latest while still departing after `now`.
///
/// Ties go to the earlier entry. Returns `None` when every connection has
/// already left.
pub fn latest_departure_after(connections: &[Connection], now: DateTime<Utc>) -> Option<&Connection> {
    connections
        .iter()
        .filter(|c| c.departure.time > now)
        .fold(None, |best: Option<&Connection>, c| match best {
            Some(b) if b.departure.time >= c.departure.time => Some(b),
            _ => Some(c),
        })
}
