//! Configuration for station ranking and connection selection.

use std::time::Duration as StdDuration;

use chrono::Duration;

/// Configuration parameters for trip planning.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// How many geometrically nearest stations survive the pre-filter
    /// and are sent to the travel-time oracle.
    pub shortlist_size: usize,

    /// Floor applied to each logarithmic scoring term (seconds).
    /// Keeps `ln` away from zero and negative inputs.
    pub log_floor_secs: f64,

    /// Upper bound on any single oracle call.
    pub oracle_timeout: StdDuration,

    /// Deadline used when a caller asks for a trip without one (minutes
    /// from now).
    pub default_horizon_mins: i64,
}

impl PlannerConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        shortlist_size: usize,
        log_floor_secs: f64,
        oracle_timeout: StdDuration,
        default_horizon_mins: i64,
    ) -> Self {
        Self {
            shortlist_size,
            log_floor_secs,
            oracle_timeout,
            default_horizon_mins,
        }
    }

    /// Set the shortlist size.
    pub fn with_shortlist_size(mut self, k: usize) -> Self {
        self.shortlist_size = k;
        self
    }

    /// Set the per-call oracle timeout.
    pub fn with_oracle_timeout(mut self, timeout: StdDuration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    /// Returns the default horizon as a Duration.
    pub fn default_horizon(&self) -> Duration {
        Duration::minutes(self.default_horizon_mins)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            shortlist_size: 3,
            log_floor_secs: 1.0,
            oracle_timeout: StdDuration::from_secs(10),
            default_horizon_mins: 120, // 2 hours
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlannerConfig::default();

        assert_eq!(config.shortlist_size, 3);
        assert_eq!(config.log_floor_secs, 1.0);
        assert_eq!(config.oracle_timeout, StdDuration::from_secs(10));
        assert_eq!(config.default_horizon_mins, 120);
    }

    #[test]
    fn duration_methods() {
        let config = PlannerConfig::default();
        assert_eq!(config.default_horizon(), Duration::minutes(120));
    }

    #[test]
    fn custom_config() {
        let config = PlannerConfig::new(5, 0.5, StdDuration::from_secs(3), 60)
            .with_shortlist_size(4)
            .with_oracle_timeout(StdDuration::from_millis(250));

        assert_eq!(config.shortlist_size, 4);
        assert_eq!(config.log_floor_secs, 0.5);
        assert_eq!(config.oracle_timeout, StdDuration::from_millis(250));
        assert_eq!(config.default_horizon_mins, 60);
    }
}
