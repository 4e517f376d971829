//! Crowd-density HTTP client.

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Europe::Brussels;
use serde_json::Value;
use tracing::debug;

use crate::domain::Point;

use super::error::BusyError;

const DEFAULT_BASE_URL: &str = "http://movestud.ugent.be/~groep4/cgi-bin/Main.py";

/// Search radius around each route point, in metres.
pub const DEFAULT_RADIUS_M: u32 = 500;

/// Configuration for the crowd-density client.
#[derive(Debug, Clone)]
pub struct BusyConfig {
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BusyConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl BusyConfig {
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Debug, Clone)]
pub struct BusyClient {
    http: reqwest::Client,
    base_url: String,
}

impl BusyClient {
    pub fn new(config: BusyConfig) -> Result<Self, BusyError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// How busy it is around `point` at the hour and weekday of `time`.
    pub async fn at_point(&self, point: Point, time: DateTime<Utc>) -> Result<Value, BusyError> {
        let params = vec![
            ("destination", format_point(point)),
            ("time", format_slot(time)),
        ];
        self.get_json(&params).await
    }

    /// Average observed speed along a route.
    pub async fn speed(
        &self,
        points: &[Point],
        time: DateTime<Utc>,
        radius_m: u32,
    ) -> Result<Value, BusyError> {
        let params = speed_params(points, time, radius_m)?;
        self.get_json(&params).await
    }

    async fn get_json(&self, params: &[(&'static str, String)]) -> Result<Value, BusyError> {
        debug!(?params, "Querying crowd density");

        let response = self.http.get(&self.base_url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BusyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| BusyError::Json {
            message: e.to_string(),
        })
    }
}

fn speed_params(
    points: &[Point],
    time: DateTime<Utc>,
    radius_m: u32,
) -> Result<Vec<(&'static str, String)>, BusyError> {
    if points.is_empty() {
        return Err(BusyError::InvalidInput("route has no points".to_string()));
    }

    Ok(vec![
        ("points", format_route(points)),
        ("time", format_slot(time)),
        ("radius", radius_m.to_string()),
    ])
}

/// `(lng lat)`
fn format_point(point: Point) -> String {
    format!("({} {})", point.lng(), point.lat())
}

/// `i:(lng lat)` entries from the last point down to the first.
fn format_route(points: &[Point]) -> String {
    points
        .iter()
        .enumerate()
        .rev()
        .map(|(i, p)| format!("{i}:{}", format_point(*p)))
        .collect::<Vec<_>>()
        .join(";")
}

/// `hour:weekday` in Belgian local time, weekdays counted from Sunday = 0.
fn format_slot(time: DateTime<Utc>) -> String {
    let local = time.with_timezone(&Brussels);
    format!("{}:{}", local.hour(), local.weekday().num_days_from_sunday())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn point(lat: f64, lng: f64) -> Point {
        Point::new(lat, lng).unwrap()
    }

    #[test]
    fn point_is_lng_first() {
        assert_eq!(format_point(point(51.05, 3.72)), "(3.72 51.05)");
    }

    #[test]
    fn route_is_listed_backwards() {
        let route = [point(51.0, 3.0), point(51.1, 3.1), point(51.2, 3.2)];
        assert_eq!(
            format_route(&route),
            "2:(3.2 51.2);1:(3.1 51.1);0:(3 51)"
        );
    }

    #[test]
    fn single_point_route_has_no_separator() {
        assert_eq!(format_route(&[point(51.0, 3.5)]), "0:(3.5 51)");
    }

    #[test]
    fn slot_uses_local_hour_and_sunday_based_weekday() {
        // Sunday 2024-01-14 23:30 UTC is Monday 00:30 in Brussels
        let time = Utc.with_ymd_and_hms(2024, 1, 14, 23, 30, 0).unwrap();
        assert_eq!(format_slot(time), "0:1");

        // Sunday 2024-07-07 10:00 UTC is 12:00 CEST
        let time = Utc.with_ymd_and_hms(2024, 7, 7, 10, 0, 0).unwrap();
        assert_eq!(format_slot(time), "12:0");
    }

    #[test]
    fn speed_query_parameters() {
        // Friday 2024-03-15 16:45 UTC is 17:45 CET
        let time = Utc.with_ymd_and_hms(2024, 3, 15, 16, 45, 0).unwrap();
        let route = [point(51.05, 3.72), point(51.036, 3.71)];

        let params = speed_params(&route, time, 250).unwrap();

        assert_eq!(
            params,
            vec![
                ("points", "1:(3.71 51.036);0:(3.72 51.05)".to_string()),
                ("time", "17:5".to_string()),
                ("radius", "250".to_string()),
            ]
        );
    }

    #[test]
    fn config_defaults() {
        let config = BusyConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 10);
    }

    #[tokio::test]
    async fn empty_route_is_rejected() {
        let client = BusyClient::new(BusyConfig::default()).unwrap();
        let result = client.speed(&[], Utc::now(), DEFAULT_RADIUS_M).await;
        assert!(matches!(result, Err(BusyError::InvalidInput(_))));
    }
}
