//! End-to-end trip planning.
//!
//! Ranks the stations nearest the origin and the destination, then picks
//! the best connection between the two shortlists.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::{Location, RankedStation, Station};

use super::config::PlannerConfig;
use super::oracle::{ConnectionOracle, Geocoder, TravelTimeOracle};
use super::ranker::{RankError, StationRanker};
use super::selector::{ConnectionSelector, SelectError, Selection};

/// Error from trip planning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("ranking stations near the origin failed: {0}")]
    Origin(RankError),

    #[error("ranking stations near the destination failed: {0}")]
    Destination(RankError),

    #[error(transparent)]
    Select(#[from] SelectError),
}

impl PlanError {
    /// Whether the caller supplied something malformed.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            PlanError::Origin(RankError::InvalidInput(_))
                | PlanError::Destination(RankError::InvalidInput(_))
                | PlanError::Select(SelectError::InvalidInput(_))
        )
    }
}

/// Request for a trip.
#[derive(Debug, Clone)]
pub struct TripRequest {
    pub origin: Location,
    pub destination: Location,

    /// When the traveller must be at the destination.
    pub deadline: DateTime<Utc>,
}

impl TripRequest {
    /// Create a new trip request.
    pub fn new(origin: Location, destination: Location, deadline: DateTime<Utc>) -> Self {
        Self {
            origin,
            destination,
            deadline,
        }
    }
}

/// A planned trip.
#[derive(Debug, Clone)]
pub struct TripPlan {
    pub selection: Selection,

    /// Stations near the origin, by travel time.
    pub origin_shortlist: Vec<RankedStation>,

    /// Stations near the destination, by travel time.
    pub destination_shortlist: Vec<RankedStation>,
}

/// Plans trips using injected oracles.
pub struct TripPlanner<'a, G, T, C> {
    geocoder: &'a G,
    travel_times: &'a T,
    connections: &'a C,
    config: &'a PlannerConfig,
}

impl<'a, G, T, C> TripPlanner<'a, G, T, C>
where
    G: Geocoder,
    T: TravelTimeOracle,
    C: ConnectionOracle,
{
    /// Create a new planner.
    pub fn new(
        geocoder: &'a G,
        travel_times: &'a T,
        connections: &'a C,
        config: &'a PlannerConfig,
    ) -> Self {
        Self {
            geocoder,
            travel_times,
            connections,
            config,
        }
    }

    /// Plan a trip over the given station list.
    ///
    /// Both rankings run concurrently; selection starts once both
    /// shortlists are known.
    pub async fn plan(
        &self,
        request: &TripRequest,
        stations: &[Station],
    ) -> Result<TripPlan, PlanError> {
        let ranker = StationRanker::new(self.geocoder, self.travel_times, self.config);
        let k = self.config.shortlist_size;

        let (origin_shortlist, destination_shortlist) = futures::join!(
            ranker.rank_closest(&request.origin, stations, k),
            ranker.rank_closest(&request.destination, stations, k),
        );
        let origin_shortlist = origin_shortlist.map_err(PlanError::Origin)?;
        let destination_shortlist = destination_shortlist.map_err(PlanError::Destination)?;

        let selector = ConnectionSelector::new(self.connections, self.config);
        let selection = selector
            .select_best(&origin_shortlist, &destination_shortlist, request.deadline)
            .await?;

        info!(
            from = %selection.origin.station().name,
            to = %selection.destination.station().name,
            departs = %selection.connection.departure.time,
            arrives = %selection.connection.arrival.time,
            meets_deadline = selection.meets_deadline,
            "Planned trip"
        );

        Ok(TripPlan {
            selection,
            origin_shortlist,
            destination_shortlist,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Connection, ConnectionQuery, Point, StationId, Stop};
    use crate::planner::oracle::{ConnectionLookupError, GeocodeError, OracleError};
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn point(lat: f64, lng: f64) -> Point {
        Point::new(lat, lng).unwrap()
    }

    fn station(id: &str, lat: f64, lng: f64) -> Station {
        Station::new(StationId::parse(id).unwrap(), id, id, point(lat, lng))
    }

    struct FixedGeocoder;

    impl Geocoder for FixedGeocoder {
        async fn geocode(&self, address: &str) -> Result<Point, GeocodeError> {
            match address {
                "Brussel" => Ok(point(50.85, 4.35)),
                _ => Err(GeocodeError::Status {
                    status: "ZERO_RESULTS".into(),
                }),
            }
        }
    }

    /// Travel time proportional to flat distance.
    struct DistanceTimes {
        calls: AtomicUsize,
    }

    impl TravelTimeOracle for DistanceTimes {
        async fn travel_times(
            &self,
            origin: Point,
            destinations: &[Point],
        ) -> Result<Vec<Duration>, OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(destinations
                .iter()
                .map(|p| Duration::seconds((origin.squared_distance(p).sqrt() * 10_000.0) as i64))
                .collect())
        }
    }

    /// Connects any pair with one direct train arriving an hour before
    /// the anchor.
    struct DirectTrains {
        calls: AtomicUsize,
    }

    impl ConnectionOracle for DirectTrains {
        async fn connections(
            &self,
            query: &ConnectionQuery,
        ) -> Result<Vec<Connection>, ConnectionLookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let anchor = query.anchor.map(|a| a.time).unwrap_or(at(0));
            let arrival = anchor - Duration::minutes(60);
            Ok(vec![Connection::new(
                Stop::new(query.from.clone(), arrival - Duration::minutes(30)),
                Stop::new(query.to.clone(), arrival),
                Duration::minutes(30),
                0,
            )])
        }
    }

    fn network() -> Vec<Station> {
        vec![
            station("GENT", 51.0357, 3.7104),
            station("GENT-DAMPOORT", 51.0561, 3.7405),
            station("BRUSSEL-ZUID", 50.8357, 4.3365),
            station("BRUSSEL-CENTRAAL", 50.8456, 4.3571),
            station("ANTWERPEN", 51.2172, 4.4211),
        ]
    }

    #[tokio::test]
    async fn plans_between_nearest_stations() {
        let travel = DistanceTimes {
            calls: AtomicUsize::new(0),
        };
        let trains = DirectTrains {
            calls: AtomicUsize::new(0),
        };
        let config = PlannerConfig::default().with_shortlist_size(2);
        let planner = TripPlanner::new(&FixedGeocoder, &travel, &trains, &config);

        let request = TripRequest::new(
            Location::Point(point(51.04, 3.72)),
            Location::Address("Brussel".into()),
            at(100_000),
        );
        let plan = planner.plan(&request, &network()).await.unwrap();

        assert_eq!(plan.origin_shortlist.len(), 2);
        assert_eq!(plan.destination_shortlist.len(), 2);
        assert_eq!(plan.origin_shortlist[0].station().id.as_str(), "GENT");
        assert_eq!(
            plan.destination_shortlist[0].station().id.as_str(),
            "BRUSSEL-CENTRAAL"
        );
        assert!(
            plan.selection
                .origin
                .station()
                .id
                .as_str()
                .starts_with("GENT")
        );
        assert!(
            plan.selection
                .destination
                .station()
                .id
                .as_str()
                .starts_with("BRUSSEL")
        );
        assert!(plan.selection.meets_deadline);

        // Two rankings, one batch each; 2 x 2 connection lookups
        assert_eq!(travel.calls.load(Ordering::SeqCst), 2);
        assert_eq!(trains.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn destination_geocode_failure_is_reported() {
        let travel = DistanceTimes {
            calls: AtomicUsize::new(0),
        };
        let trains = DirectTrains {
            calls: AtomicUsize::new(0),
        };
        let config = PlannerConfig::default();
        let planner = TripPlanner::new(&FixedGeocoder, &travel, &trains, &config);

        let request = TripRequest::new(
            Location::Point(point(51.04, 3.72)),
            Location::Address("Atlantis".into()),
            at(100_000),
        );
        let result = planner.plan(&request, &network()).await;

        assert!(matches!(
            result,
            Err(PlanError::Destination(RankError::Geocode(_)))
        ));
        assert_eq!(trains.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_station_list_is_invalid_input() {
        let travel = DistanceTimes {
            calls: AtomicUsize::new(0),
        };
        let trains = DirectTrains {
            calls: AtomicUsize::new(0),
        };
        let config = PlannerConfig::default();
        let planner = TripPlanner::new(&FixedGeocoder, &travel, &trains, &config);

        let request = TripRequest::new(
            Location::Point(point(51.04, 3.72)),
            Location::Point(point(50.85, 4.35)),
            at(100_000),
        );
        let err = planner.plan(&request, &[]).await.unwrap_err();

        assert!(err.is_invalid_input());
    }
}
