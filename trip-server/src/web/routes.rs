//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::busy::{BusyError, DEFAULT_RADIUS_M};
use crate::domain::Point;
use crate::planner::{PlanError, SelectError, TripPlanner, TripRequest};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stations/search", get(search_stations))
        .route("/api/trip/plan", post(plan_trip))
        .route("/api/busy", get(busy))
        .route("/api/busy/speed", get(busy_speed))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Search stations by name.
async fn search_stations(
    State(state): State<AppState>,
    Query(req): Query<StationSearchRequest>,
) -> Json<StationSearchResponse> {
    let limit = req.limit.unwrap_or(10).min(50);
    let matches = state.stations.search(&req.q, limit).await;

    Json(StationSearchResponse {
        stations: matches.iter().map(Into::into).collect(),
    })
}

/// Plan a trip from an origin to a destination, arriving by a deadline.
async fn plan_trip(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PlanTripResponse>, AppError> {
    // Parse by hand so malformed bodies get a JSON error like everything else
    let req: PlanTripRequest = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, body = %String::from_utf8_lossy(&body), "Rejected trip request");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;

    let deadline = req
        .arrive_by
        .unwrap_or_else(|| Utc::now() + state.config.default_horizon());

    let stations = state.stations.all().await;
    let planner = TripPlanner::new(
        state.geocoder.as_ref(),
        state.travel_times.as_ref(),
        state.connections.as_ref(),
        &state.config,
    );

    let request = TripRequest::new(req.origin, req.destination, deadline);
    let plan = planner.plan(&request, &stations).await?;
    debug!(
        cached_connections = state.connections.cache_entry_count(),
        cached_addresses = state.geocoder.cache_entry_count(),
        "Planned trip"
    );

    Ok(Json(PlanTripResponse::new(plan, deadline)))
}

/// Crowd density around a point.
async fn busy(
    State(state): State<AppState>,
    Query(req): Query<BusyRequest>,
) -> Result<Json<Value>, AppError> {
    let point = Point::new(req.lat, req.lng).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;
    let at = req.at.unwrap_or_else(Utc::now);

    let data = state.busy.at_point(point, at).await?;
    Ok(Json(data))
}

/// Average observed speed along a route.
async fn busy_speed(
    State(state): State<AppState>,
    Query(req): Query<BusySpeedRequest>,
) -> Result<Json<Value>, AppError> {
    let points = req
        .points
        .split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::parse::<Point>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?;
    let radius = req.radius.unwrap_or(DEFAULT_RADIUS_M);
    let at = req.at.unwrap_or_else(Utc::now);

    let data = state.busy.speed(&points, at, radius).await?;
    Ok(Json(data))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    /// An upstream provider failed
    BadGateway { message: String },
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        let message = e.to_string();
        match e {
            e if e.is_invalid_input() => AppError::BadRequest { message },
            PlanError::Select(SelectError::NoViableConnection { .. }) => {
                AppError::NotFound { message }
            }
            _ => AppError::BadGateway { message },
        }
    }
}

impl From<BusyError> for AppError {
    fn from(e: BusyError) -> Self {
        match e {
            BusyError::InvalidInput(message) => AppError::BadRequest { message },
            e => AppError::BadGateway {
                message: e.to_string(),
            },
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::BadGateway { message } => message,
        };

        if status.is_server_error() {
            warn!(%status, %message, "Request failed");
        } else {
            debug!(%status, %message, "Request rejected");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
