//! Closest-station ranking.
//!
//! A cheap geometric pre-filter picks the `k` nearest candidates, then one
//! batched travel-time request re-ranks that shortlist by actual travel
//! time.

use chrono::Duration;
use tracing::{debug, trace};

use crate::domain::{Location, Point, RankedStation, Station};

use super::config::PlannerConfig;
use super::oracle::{GeocodeError, Geocoder, OracleError, TravelTimeOracle, with_timeout};

/// Error from station ranking.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RankError {
    /// Malformed arguments; retrying without changing them will not help.
    #[error("invalid ranking input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Select the `k` candidates nearest to `origin` by flat squared distance.
///
/// Ties keep input order. A `k` larger than the candidate list returns the
/// whole list, nearest first.
pub fn shortlist<'s>(origin: &Point, candidates: &'s [Station], k: usize) -> Vec<&'s Station> {
    let mut by_distance: Vec<(usize, f64)> = candidates
        .iter()
        .enumerate()
        .map(|(idx, s)| (idx, origin.squared_distance(&s.location)))
        .collect();

    // sort_by is stable, so equal distances stay in input order
    by_distance.sort_by(|a, b| a.1.total_cmp(&b.1));
    by_distance.truncate(k);

    by_distance
        .into_iter()
        .map(|(idx, _)| &candidates[idx])
        .collect()
}

/// Ranks stations by travel time from an origin.
pub struct StationRanker<'a, G, T> {
    geocoder: &'a G,
    oracle: &'a T,
    config: &'a PlannerConfig,
}

impl<'a, G: Geocoder, T: TravelTimeOracle> StationRanker<'a, G, T> {
    /// Create a new ranker.
    pub fn new(geocoder: &'a G, oracle: &'a T, config: &'a PlannerConfig) -> Self {
        Self {
            geocoder,
            oracle,
            config,
        }
    }

    /// Rank the stations closest to `origin`.
    ///
    /// Addresses are geocoded first. The `k` geometrically nearest
    /// candidates are then sent to the travel-time oracle in a single
    /// batch and returned sorted by travel time, ties in shortlist order.
    pub async fn rank_closest(
        &self,
        origin: &Location,
        candidates: &[Station],
        k: usize,
    ) -> Result<Vec<RankedStation>, RankError> {
        if candidates.is_empty() {
            return Err(RankError::InvalidInput(
                "candidate station list is empty".to_string(),
            ));
        }
        if k == 0 {
            return Err(RankError::InvalidInput(
                "shortlist size must be positive".to_string(),
            ));
        }

        let origin = self.resolve(origin).await?;
        self.rank_from_point(origin, candidates, k).await
    }

    /// Turn a location into coordinates, geocoding if needed.
    pub async fn resolve(&self, location: &Location) -> Result<Point, RankError> {
        match location {
            Location::Point(p) => Ok(*p),
            Location::Address(address) => {
                let address = address.trim();
                if address.is_empty() {
                    return Err(RankError::InvalidInput("address is empty".to_string()));
                }
                debug!(address, "Geocoding origin");
                let point = with_timeout(self.config.oracle_timeout, self.geocoder.geocode(address))
                    .await
                    .ok_or(GeocodeError::Timeout)??;
                Ok(point)
            }
        }
    }

    async fn rank_from_point(
        &self,
        origin: Point,
        candidates: &[Station],
        k: usize,
    ) -> Result<Vec<RankedStation>, RankError> {
        let shortlisted = shortlist(&origin, candidates, k);
        let points: Vec<Point> = shortlisted.iter().map(|s| s.location).collect();

        trace!(
            origin = %origin,
            candidates = candidates.len(),
            shortlisted = shortlisted.len(),
            "Requesting travel times for shortlist"
        );

        let durations = with_timeout(
            self.config.oracle_timeout,
            self.oracle.travel_times(origin, &points),
        )
        .await
        .ok_or(OracleError::Timeout)??;

        if durations.len() != shortlisted.len() {
            return Err(OracleError::Malformed(format!(
                "expected {} durations, got {}",
                shortlisted.len(),
                durations.len()
            ))
            .into());
        }
        if durations.iter().any(|d| *d < Duration::zero()) {
            return Err(OracleError::Malformed("negative travel time".to_string()).into());
        }

        let mut ranked: Vec<(&Station, Duration)> =
            shortlisted.into_iter().zip(durations).collect();
        ranked.sort_by_key(|(_, d)| *d);

        debug!(
            origin = %origin,
            nearest = ranked.first().map(|(s, _)| s.name.as_str()).unwrap_or(""),
            "Ranked closest stations"
        );

        Ok(ranked
            .into_iter()
            .map(|(station, d)| RankedStation::new(station.clone(), d))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StationId;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration as StdDuration;

    fn point(lat: f64, lng: f64) -> Point {
        Point::new(lat, lng).unwrap()
    }

    fn station(id: &str, lat: f64, lng: f64) -> Station {
        Station::new(StationId::parse(id).unwrap(), id, id, point(lat, lng))
    }

    /// Geocoder that knows a fixed set of addresses.
    struct MockGeocoder {
        known: Vec<(&'static str, Point)>,
        calls: AtomicUsize,
    }

    impl MockGeocoder {
        fn new(known: Vec<(&'static str, Point)>) -> Self {
            Self {
                known,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Geocoder for MockGeocoder {
        async fn geocode(&self, address: &str) -> Result<Point, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.known
                .iter()
                .find(|(a, _)| *a == address)
                .map(|(_, p)| *p)
                .ok_or(GeocodeError::Status {
                    status: "ZERO_RESULTS".to_string(),
                })
        }
    }

    /// Travel-time oracle returning configured durations per point.
    struct MockTravelTimes {
        table: Vec<(Point, i64)>,
        default_secs: i64,
        batches: Mutex<Vec<usize>>,
        fail_with: Option<OracleError>,
    }

    impl MockTravelTimes {
        fn new(table: Vec<(Point, i64)>) -> Self {
            Self {
                table,
                default_secs: 600,
                batches: Mutex::new(Vec::new()),
                fail_with: None,
            }
        }

        fn failing(err: OracleError) -> Self {
            Self {
                fail_with: Some(err),
                ..Self::new(vec![])
            }
        }

        fn batches(&self) -> Vec<usize> {
            self.batches.lock().unwrap().clone()
        }
    }

    impl TravelTimeOracle for MockTravelTimes {
        async fn travel_times(
            &self,
            _origin: Point,
            destinations: &[Point],
        ) -> Result<Vec<Duration>, OracleError> {
            self.batches.lock().unwrap().push(destinations.len());
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            Ok(destinations
                .iter()
                .map(|p| {
                    let secs = self
                        .table
                        .iter()
                        .find(|(q, _)| q == p)
                        .map(|(_, s)| *s)
                        .unwrap_or(self.default_secs);
                    Duration::seconds(secs)
                })
                .collect())
        }
    }

    /// Oracle that returns one duration too few.
    struct ShortOracle;

    impl TravelTimeOracle for ShortOracle {
        async fn travel_times(
            &self,
            _origin: Point,
            destinations: &[Point],
        ) -> Result<Vec<Duration>, OracleError> {
            Ok(vec![Duration::seconds(60); destinations.len().saturating_sub(1)])
        }
    }

    /// Oracle that never answers in time.
    struct SlowOracle;

    impl TravelTimeOracle for SlowOracle {
        async fn travel_times(
            &self,
            _origin: Point,
            destinations: &[Point],
        ) -> Result<Vec<Duration>, OracleError> {
            tokio::time::sleep(StdDuration::from_secs(60)).await;
            Ok(vec![Duration::zero(); destinations.len()])
        }
    }

    fn stations() -> Vec<Station> {
        vec![
            station("FAR", 52.0, 5.0),
            station("NEAR1", 51.01, 3.71),
            station("NEAR2", 51.02, 3.72),
            station("NEAR3", 51.03, 3.73),
            station("MID", 51.5, 4.0),
        ]
    }

    #[test]
    fn shortlist_picks_nearest_in_distance_order() {
        let stations = stations();
        let origin = point(51.0, 3.7);

        let picked: Vec<&str> = shortlist(&origin, &stations, 3)
            .iter()
            .map(|s| s.id.as_str())
            .collect();

        assert_eq!(picked, vec!["NEAR1", "NEAR2", "NEAR3"]);
    }

    #[test]
    fn shortlist_ties_keep_input_order() {
        let stations = vec![
            station("B", 51.0, 3.8),
            station("A", 51.0, 3.6),
            station("C", 51.1, 3.7),
        ];
        let origin = point(51.0, 3.7);

        // B and A are equidistant; B comes first in the input
        let picked: Vec<&str> = shortlist(&origin, &stations, 2)
            .iter()
            .map(|s| s.id.as_str())
            .collect();

        assert_eq!(picked, vec!["B", "A"]);
    }

    #[test]
    fn shortlist_does_not_reorder_input() {
        let stations = stations();
        let before = stations.clone();
        let _ = shortlist(&point(51.0, 3.7), &stations, 2);
        assert_eq!(stations, before);
    }

    #[tokio::test]
    async fn reranks_by_travel_time() {
        let stations = stations();
        // NEAR1 is closest as the crow flies but slowest to reach
        let oracle = MockTravelTimes::new(vec![
            (point(51.01, 3.71), 900),
            (point(51.02, 3.72), 300),
            (point(51.03, 3.73), 450),
        ]);
        let geocoder = MockGeocoder::new(vec![]);
        let config = PlannerConfig::default();
        let ranker = StationRanker::new(&geocoder, &oracle, &config);

        let ranked = ranker
            .rank_closest(&Location::Point(point(51.0, 3.7)), &stations, 3)
            .await
            .unwrap();

        let ids: Vec<&str> = ranked.iter().map(|r| r.station().id.as_str()).collect();
        assert_eq!(ids, vec!["NEAR2", "NEAR3", "NEAR1"]);
        assert_eq!(ranked[0].travel_time_to(), Duration::seconds(300));
        assert_eq!(ranked[2].travel_time_to(), Duration::seconds(900));
    }

    #[tokio::test]
    async fn oracle_called_once_with_whole_shortlist() {
        let stations = stations();
        let oracle = MockTravelTimes::new(vec![]);
        let geocoder = MockGeocoder::new(vec![]);
        let config = PlannerConfig::default();
        let ranker = StationRanker::new(&geocoder, &oracle, &config);

        ranker
            .rank_closest(&Location::Point(point(51.0, 3.7)), &stations, 3)
            .await
            .unwrap();

        assert_eq!(oracle.batches(), vec![3]);
    }

    #[tokio::test]
    async fn equal_travel_times_keep_shortlist_order() {
        let stations = stations();
        let oracle = MockTravelTimes::new(vec![]); // everything 600s
        let geocoder = MockGeocoder::new(vec![]);
        let config = PlannerConfig::default();
        let ranker = StationRanker::new(&geocoder, &oracle, &config);

        let ranked = ranker
            .rank_closest(&Location::Point(point(51.0, 3.7)), &stations, 3)
            .await
            .unwrap();

        let ids: Vec<&str> = ranked.iter().map(|r| r.station().id.as_str()).collect();
        assert_eq!(ids, vec!["NEAR1", "NEAR2", "NEAR3"]);
    }

    #[tokio::test]
    async fn k_larger_than_candidates_clamps() {
        let stations = vec![station("A", 51.0, 3.7), station("B", 51.1, 3.8)];
        let oracle = MockTravelTimes::new(vec![]);
        let geocoder = MockGeocoder::new(vec![]);
        let config = PlannerConfig::default();
        let ranker = StationRanker::new(&geocoder, &oracle, &config);

        let ranked = ranker
            .rank_closest(&Location::Point(point(51.0, 3.7)), &stations, 10)
            .await
            .unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!(oracle.batches(), vec![2]);
    }

    #[tokio::test]
    async fn empty_candidates_is_invalid_input() {
        let oracle = MockTravelTimes::new(vec![]);
        let geocoder = MockGeocoder::new(vec![]);
        let config = PlannerConfig::default();
        let ranker = StationRanker::new(&geocoder, &oracle, &config);

        let result = ranker
            .rank_closest(&Location::Point(point(51.0, 3.7)), &[], 3)
            .await;

        assert!(matches!(result, Err(RankError::InvalidInput(_))));
        assert!(oracle.batches().is_empty());
    }

    #[tokio::test]
    async fn zero_k_is_invalid_input() {
        let oracle = MockTravelTimes::new(vec![]);
        let geocoder = MockGeocoder::new(vec![]);
        let config = PlannerConfig::default();
        let ranker = StationRanker::new(&geocoder, &oracle, &config);

        let result = ranker
            .rank_closest(&Location::Point(point(51.0, 3.7)), &stations(), 0)
            .await;

        assert!(matches!(result, Err(RankError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn address_is_geocoded_first() {
        let stations = stations();
        let oracle = MockTravelTimes::new(vec![]);
        let geocoder = MockGeocoder::new(vec![("Amsterdam", point(52.0, 5.0))]);
        let config = PlannerConfig::default();
        let ranker = StationRanker::new(&geocoder, &oracle, &config);

        let ranked = ranker
            .rank_closest(&Location::Address("Amsterdam".into()), &stations, 1)
            .await
            .unwrap();

        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(ranked[0].station().id.as_str(), "FAR");
    }

    #[tokio::test]
    async fn geocode_failure_propagates() {
        let oracle = MockTravelTimes::new(vec![]);
        let geocoder = MockGeocoder::new(vec![]);
        let config = PlannerConfig::default();
        let ranker = StationRanker::new(&geocoder, &oracle, &config);

        let result = ranker
            .rank_closest(&Location::Address("Nowhere".into()), &stations(), 3)
            .await;

        assert!(matches!(
            result,
            Err(RankError::Geocode(GeocodeError::Status { .. }))
        ));
        assert!(oracle.batches().is_empty());
    }

    #[tokio::test]
    async fn blank_address_is_invalid_input() {
        let oracle = MockTravelTimes::new(vec![]);
        let geocoder = MockGeocoder::new(vec![]);
        let config = PlannerConfig::default();
        let ranker = StationRanker::new(&geocoder, &oracle, &config);

        let result = ranker
            .rank_closest(&Location::Address("   ".into()), &stations(), 3)
            .await;

        assert!(matches!(result, Err(RankError::InvalidInput(_))));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn oracle_failure_carries_status() {
        let oracle = MockTravelTimes::failing(OracleError::Status {
            status: "OVER_QUERY_LIMIT".into(),
        });
        let geocoder = MockGeocoder::new(vec![]);
        let config = PlannerConfig::default();
        let ranker = StationRanker::new(&geocoder, &oracle, &config);

        let result = ranker
            .rank_closest(&Location::Point(point(51.0, 3.7)), &stations(), 3)
            .await;

        assert_eq!(
            result,
            Err(RankError::Oracle(OracleError::Status {
                status: "OVER_QUERY_LIMIT".into()
            }))
        );
    }

    #[tokio::test]
    async fn misaligned_oracle_response_is_malformed() {
        let geocoder = MockGeocoder::new(vec![]);
        let config = PlannerConfig::default();
        let ranker = StationRanker::new(&geocoder, &ShortOracle, &config);

        let result = ranker
            .rank_closest(&Location::Point(point(51.0, 3.7)), &stations(), 3)
            .await;

        assert!(matches!(
            result,
            Err(RankError::Oracle(OracleError::Malformed(_)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_oracle_times_out() {
        let geocoder = MockGeocoder::new(vec![]);
        let config = PlannerConfig::default().with_oracle_timeout(StdDuration::from_secs(1));
        let ranker = StationRanker::new(&geocoder, &SlowOracle, &config);

        let result = ranker
            .rank_closest(&Location::Point(point(51.0, 3.7)), &stations(), 3)
            .await;

        assert_eq!(result, Err(RankError::Oracle(OracleError::Timeout)));
    }
}
