//! Conversion between iRail DTOs and domain types.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Europe::Brussels;
use tracing::debug;

use crate::domain::{
    Connection, ConnectionQuery, Point, Station, StationId, Stop, TimeSelector,
};

use super::types::{
    ConnectionDto, ConnectionsResponse, Numeric, StationDto, StationsResponse, StopDto,
};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConversionError {
    #[error("invalid station: {0}")]
    InvalidStation(String),

    #[error("invalid coordinates: {0}")]
    InvalidLocation(String),

    #[error("invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: Numeric },
}

/// Convert a station list, skipping rows that do not validate.
pub fn convert_stations(response: &StationsResponse) -> Vec<Station> {
    response
        .station
        .iter()
        .filter_map(|dto| match convert_station(dto) {
            Ok(station) => Some(station),
            Err(e) => {
                debug!(id = %dto.id, error = %e, "Skipping station");
                None
            }
        })
        .collect()
}

fn convert_station(dto: &StationDto) -> Result<Station, ConversionError> {
    let id = StationId::parse(&dto.id).map_err(|e| ConversionError::InvalidStation(e.to_string()))?;

    let lng = dto
        .location_x
        .as_f64()
        .ok_or_else(|| number_error("locationX", &dto.location_x))?;
    let lat = dto
        .location_y
        .as_f64()
        .ok_or_else(|| number_error("locationY", &dto.location_y))?;
    let location =
        Point::new(lat, lng).map_err(|e| ConversionError::InvalidLocation(e.to_string()))?;

    Ok(Station::new(id, &dto.name, &dto.standardname, location))
}

/// Convert a connections response, skipping connections that do not
/// validate. Provider order is preserved.
pub fn convert_connections(response: &ConnectionsResponse) -> Vec<Connection> {
    response
        .connection
        .iter()
        .filter_map(|dto| match convert_connection(dto) {
            Ok(conn) => Some(conn),
            Err(e) => {
                debug!(
                    from = %dto.departure.station,
                    to = %dto.arrival.station,
                    error = %e,
                    "Skipping connection"
                );
                None
            }
        })
        .collect()
}

fn convert_connection(dto: &ConnectionDto) -> Result<Connection, ConversionError> {
    let departure = convert_stop(&dto.departure)?;
    let arrival = convert_stop(&dto.arrival)?;

    let duration = dto
        .duration
        .as_i64()
        .filter(|secs| *secs >= 0)
        .and_then(Duration::try_seconds)
        .ok_or_else(|| number_error("duration", &dto.duration))?;

    let vias = match &dto.vias {
        None => 0,
        Some(vias) => vias
            .number
            .as_i64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| number_error("vias", &vias.number))?,
    };

    Ok(Connection::new(
        departure,
        arrival,
        duration,
        vias,
    ))
}

fn convert_stop(dto: &StopDto) -> Result<Stop, ConversionError> {
    let time = dto
        .time
        .as_i64()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .ok_or_else(|| number_error("time", &dto.time))?;

    let mut stop = Stop::new(&dto.station, time);

    if let Some(platform) = dto.platform.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        stop = stop.with_platform(platform);
    }

    if let Some(delay) = &dto.delay {
        let delay_secs = delay
            .as_i64()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| number_error("delay", delay))?;
        stop = stop.with_delay(delay_secs);
    }

    Ok(stop)
}

fn number_error(field: &'static str, value: &Numeric) -> ConversionError {
    ConversionError::InvalidNumber {
        field,
        value: value.clone(),
    }
}

/// Query parameters for a connection lookup, excluding `format` and `lang`.
///
/// Anchor times are sent as Belgian local date (`ddmmyy`) and time (`HHMM`).
pub fn connection_params(query: &ConnectionQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("from", query.from.clone()), ("to", query.to.clone())];

    if let Some(anchor) = query.anchor {
        let local = anchor.time.with_timezone(&Brussels);
        let selector = match anchor.selector {
            TimeSelector::Arrive => "arrival",
            TimeSelector::Depart => "departure",
        };
        params.push(("date", local.format("%d%m%y").to_string()));
        params.push(("time", local.format("%H%M").to_string()));
        params.push(("timesel", selector.to_string()));
    }

    params
}
