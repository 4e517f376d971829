//! Best-connection selection over every origin/destination station pair.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::domain::{Connection, ConnectionQuery, RankedStation, StationId, TimeAnchor};

use super::config::PlannerConfig;
use super::oracle::{ConnectionLookupError, ConnectionOracle, with_timeout};
use super::score::score;

/// Error from connection selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    #[error("invalid selection input: {0}")]
    InvalidInput(String),

    /// Every pairing was tried and none produced a connection.
    #[error("no viable connection among {pairs_queried} station pairs ({failed} failed)")]
    NoViableConnection { pairs_queried: usize, failed: usize },
}

/// A station pairing whose connection lookup failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairFailure {
    pub origin: StationId,
    pub destination: StationId,
    pub error: ConnectionLookupError,
}

/// The winning connection and how it was chosen.
#[derive(Debug, Clone)]
pub struct Selection {
    pub connection: Connection,

    /// Score of the winner; `f64::INFINITY` when nothing met the deadline.
    pub score: f64,

    /// Station the connection departs from.
    pub origin: RankedStation,

    /// Station the connection arrives at.
    pub destination: RankedStation,

    /// False when the winner is a late fallback.
    pub meets_deadline: bool,

    /// Number of oracle requests issued (one per pair).
    pub pairs_queried: usize,

    /// Pairings that contributed no candidates because their lookup failed.
    pub failures: Vec<PairFailure>,
}

/// A connection waiting to be scored, tagged with its pairing.
struct Candidate {
    origin_idx: usize,
    destination_idx: usize,
    connection: Connection,
}

/// Picks the best connection across all station pairings.
pub struct ConnectionSelector<'a, C> {
    oracle: &'a C,
    config: &'a PlannerConfig,
}

impl<'a, C: ConnectionOracle> ConnectionSelector<'a, C> {
    /// Create a new selector.
    pub fn new(oracle: &'a C, config: &'a PlannerConfig) -> Self {
        Self { oracle, config }
    }

    /// Select the best connection from any origin to any destination
    /// station, arriving in time for `deadline`.
    ///
    /// One request per pair is issued, all at once, and scoring only starts
    /// after every request has finished. A failed request contributes no
    /// candidates. Late connections are kept as a last resort.
    pub async fn select_best(
        &self,
        origins: &[RankedStation],
        destinations: &[RankedStation],
        deadline: DateTime<Utc>,
    ) -> Result<Selection, SelectError> {
        if origins.is_empty() {
            return Err(SelectError::InvalidInput(
                "origin station list is empty".to_string(),
            ));
        }
        if destinations.is_empty() {
            return Err(SelectError::InvalidInput(
                "destination station list is empty".to_string(),
            ));
        }

        let pairs = (0..origins.len())
            .flat_map(|o| (0..destinations.len()).map(move |d| (o, d)))
            .map(|(o, d)| query_for(&origins[o], &destinations[d], deadline).map(|q| (o, d, q)))
            .collect::<Result<Vec<_>, SelectError>>()?;
        let pairs_queried = pairs.len();

        let requests = pairs.into_iter().map(|(o, d, query)| {
            async move {
                let result = with_timeout(self.config.oracle_timeout, self.oracle.connections(&query))
                    .await
                    .unwrap_or(Err(ConnectionLookupError::Timeout));
                (o, d, result)
            }
        });

        // Scoring starts only once every pair has answered
        let responses = join_all(requests).await;

        let mut pool = Vec::new();
        let mut failures = Vec::new();

        for (o, d, result) in responses {
            match result {
                Ok(connections) => {
                    pool.extend(connections.into_iter().map(|connection| Candidate {
                        origin_idx: o,
                        destination_idx: d,
                        connection,
                    }));
                }
                Err(error) => {
                    let origin = origins[o].station();
                    let destination = destinations[d].station();
                    warn!(
                        from = %origin.standard_name,
                        to = %destination.standard_name,
                        error = %error,
                        "Connection lookup failed, pair contributes no candidates"
                    );
                    failures.push(PairFailure {
                        origin: origin.id.clone(),
                        destination: destination.id.clone(),
                        error,
                    });
                }
            }
        }

        let best = self.pick(&pool, origins, destinations, deadline);

        let Some((idx, best_score)) = best else {
            return Err(SelectError::NoViableConnection {
                pairs_queried,
                failed: failures.len(),
            });
        };

        let winner = pool.swap_remove(idx);
        let origin = origins[winner.origin_idx].clone();
        let destination = destinations[winner.destination_idx].clone();

        debug!(
            from = %origin.station().standard_name,
            to = %destination.station().standard_name,
            score = best_score,
            candidates = pool.len() + 1,
            "Selected best connection"
        );

        Ok(Selection {
            connection: winner.connection,
            score: best_score,
            origin,
            destination,
            meets_deadline: best_score.is_finite(),
            pairs_queried,
            failures,
        })
    }

    /// Index and score of the lowest-scoring candidate; first wins ties.
    fn pick(
        &self,
        pool: &[Candidate],
        origins: &[RankedStation],
        destinations: &[RankedStation],
        deadline: DateTime<Utc>,
    ) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;

        for (idx, candidate) in pool.iter().enumerate() {
            let s = score(
                &candidate.connection,
                origins[candidate.origin_idx].travel_time_to(),
                destinations[candidate.destination_idx].travel_time_to(),
                deadline,
                self.config.log_floor_secs,
            );
            match best {
                Some((_, best_score)) if s >= best_score => {}
                _ => best = Some((idx, s)),
            }
        }

        best
    }
}

/// Build the lookup for one pair: arrive at the destination station early
/// enough to cover the remaining stretch before the deadline.
fn query_for(
    origin: &RankedStation,
    destination: &RankedStation,
    deadline: DateTime<Utc>,
) -> Result<ConnectionQuery, SelectError> {
    let latest_arrival = deadline
        .checked_sub_signed(destination.travel_time_to())
        .ok_or_else(|| {
            SelectError::InvalidInput(format!(
                "deadline {deadline} leaves no representable arrival time at {}",
                destination.station().standard_name
            ))
        })?;

    Ok(ConnectionQuery::new(
        origin.station().standard_name.clone(),
        destination.station().standard_name.clone(),
    )
    .with_anchor(TimeAnchor::arrive_by(latest_arrival)))
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
