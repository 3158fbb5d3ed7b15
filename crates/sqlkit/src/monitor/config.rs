use std::time::Duration;

/// Slow-query threshold applied when none is configured explicitly.
pub const DEFAULT_SLOW_QUERY_THRESHOLD: Duration = Duration::from_millis(2000);

/// Configuration for query monitoring.
///
/// Monitoring is enabled by default with a 2 s slow-query threshold. Error events
/// are reported regardless of `monitoring_enabled`.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Slow query threshold. `None` disables slow-query events.
    pub slow_query_threshold: Option<Duration>,
    /// Whether query/slow events are emitted.
    pub monitoring_enabled: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            slow_query_threshold: Some(DEFAULT_SLOW_QUERY_THRESHOLD),
            monitoring_enabled: true,
        }
    }
}

impl MonitorConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the slow query threshold.
    ///
    /// Statements taking at least this long trigger `on_slow_query` callbacks.
    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    /// Disable slow-query events.
    pub fn without_slow_query_threshold(mut self) -> Self {
        self.slow_query_threshold = None;
        self
    }

    /// Enable monitoring.
    pub fn enable_monitoring(mut self) -> Self {
        self.monitoring_enabled = true;
        self
    }

    /// Disable monitoring.
    pub fn disable_monitoring(mut self) -> Self {
        self.monitoring_enabled = false;
        self
    }

    pub(crate) fn is_slow(&self, duration: Duration) -> bool {
        self.slow_query_threshold
            .is_some_and(|threshold| duration >= threshold)
    }
}
