//! Transit connections and the queries that produce them.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// One end of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stop {
    /// Station name as reported by the transit provider.
    pub station: String,

    /// Scheduled time at this stop.
    pub time: DateTime<Utc>,

    pub platform: Option<String>,

    /// Current delay on top of the scheduled time.
    #[serde(serialize_with = "serialize_secs")]
    pub delay: Duration,
}

impl Stop {
    pub fn new(station: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            station: station.into(),
            time,
            platform: None,
            delay: Duration::zero(),
        }
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Scheduled time plus delay, if representable.
    pub fn expected_time(&self) -> Option<DateTime<Utc>> {
        self.time.checked_add_signed(self.delay)
    }
}

/// A single transit connection between two stations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub departure: Stop,
    pub arrival: Stop,

    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,

    /// Number of intermediate transfers.
    pub vias: u32,
}

impl Connection {
    pub fn new(departure: Stop, arrival: Stop, duration: Duration, vias: u32) -> Self {
        Self {
            departure,
            arrival,
            duration,
            vias,
        }
    }

    /// Whether the connection is direct (no transfers).
    pub fn is_direct(&self) -> bool {
        self.vias == 0
    }
}

/// Whether a query time is a latest arrival or an earliest departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeSelector {
    Arrive,
    Depart,
}

/// A time constraint for a connection query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeAnchor {
    pub time: DateTime<Utc>,
    pub selector: TimeSelector,
}

impl TimeAnchor {
    pub fn arrive_by(time: DateTime<Utc>) -> Self {
        Self {
            time,
            selector: TimeSelector::Arrive,
        }
    }

    pub fn depart_after(time: DateTime<Utc>) -> Self {
        Self {
            time,
            selector: TimeSelector::Depart,
        }
    }
}

/// Request for connections between two stations, keyed by their
/// standardized names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionQuery {
    pub from: String,
    pub to: String,
    pub anchor: Option<TimeAnchor>,
}

impl ConnectionQuery {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            anchor: None,
        }
    }

    pub fn with_anchor(mut self, anchor: TimeAnchor) -> Self {
        self.anchor = Some(anchor);
        self
    }
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(d.num_seconds())
}
