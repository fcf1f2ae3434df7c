//! Search configuration for the connection paginator.

use chrono::Duration;

/// Default number of consecutive all-duplicate pages tolerated before the
/// provider is considered exhausted (one hour of one-minute probes).
const DEFAULT_MAX_CONSECUTIVE_PROBES: u32 = 60;

/// Configuration parameters for connection search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// How far to move the cursor when a page contains nothing new (minutes).
    pub probe_increment_mins: i64,

    /// Give up after this many consecutive pages without a new connection.
    /// `None` keeps probing forever.
    pub max_consecutive_probes: Option<u32>,
}

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(probe_increment_mins: i64, max_consecutive_probes: Option<u32>) -> Self {
        Self {
            probe_increment_mins,
            max_consecutive_probes,
        }
    }

    /// Probe forever when the provider only returns duplicates.
    pub fn unbounded() -> Self {
        Self {
            max_consecutive_probes: None,
            ..Self::default()
        }
    }

    /// Set the consecutive probe limit.
    pub fn with_max_probes(mut self, probes: u32) -> Self {
        self.max_consecutive_probes = Some(probes);
        self
    }

    /// Returns the probe increment as a Duration.
    pub fn probe_increment(&self) -> Duration {
        Duration::minutes(self.probe_increment_mins)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            probe_increment_mins: 1,
            max_consecutive_probes: Some(DEFAULT_MAX_CONSECUTIVE_PROBES),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SearchConfig::default();

        assert_eq!(config.probe_increment_mins, 1);
        assert_eq!(config.max_consecutive_probes, Some(60));
        assert_eq!(config.probe_increment(), Duration::minutes(1));
    }

    #[test]
    fn unbounded_config() {
        let config = SearchConfig::unbounded();

        assert_eq!(config.max_consecutive_probes, None);
        assert_eq!(config.probe_increment_mins, 1);
    }

    #[test]
    fn custom_config() {
        let config = SearchConfig::new(5, None).with_max_probes(3);

        assert_eq!(config.probe_increment(), Duration::minutes(5));
        assert_eq!(config.max_consecutive_probes, Some(3));
    }
}
