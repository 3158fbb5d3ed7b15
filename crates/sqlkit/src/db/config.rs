use crate::monitor::MonitorConfig;
use std::time::Duration;

/// Construction-time settings for [`Db`](super::Db).
#[derive(Debug, Clone, Default)]
pub struct DbConfig {
    /// Query/slow event settings for the instrumented executor.
    pub monitor: MonitorConfig,
    /// Identifier quote character. `None` uses the dialect's own.
    pub identifier_quote: Option<char>,
}

impl DbConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statements taking at least this long emit a slow event.
    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.monitor = self.monitor.with_slow_query_threshold(threshold);
        self
    }

    pub fn without_slow_query_threshold(mut self) -> Self {
        self.monitor = self.monitor.without_slow_query_threshold();
        self
    }

    pub fn enable_monitoring(mut self) -> Self {
        self.monitor = self.monitor.enable_monitoring();
        self
    }

    pub fn disable_monitoring(mut self) -> Self {
        self.monitor = self.monitor.disable_monitoring();
        self
    }

    /// Quote identifiers with `quote` instead of the dialect default.
    pub fn with_identifier_quote(mut self, quote: char) -> Self {
        self.identifier_quote = Some(quote);
        self
    }

    pub fn with_monitor_config(mut self, monitor: MonitorConfig) -> Self {
        self.monitor = monitor;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::DEFAULT_SLOW_QUERY_THRESHOLD;

    #[test]
    fn defaults() {
        let config = DbConfig::new();
        assert_eq!(
            config.monitor.slow_query_threshold,
            Some(DEFAULT_SLOW_QUERY_THRESHOLD)
        );
        assert!(config.monitor.monitoring_enabled);
        assert_eq!(config.identifier_quote, None);
    }

    #[test]
    fn builder_chain() {
        let config = DbConfig::new()
            .with_slow_query_threshold(Duration::from_millis(50))
            .disable_monitoring()
            .with_identifier_quote('"');
        assert_eq!(
            config.monitor.slow_query_threshold,
            Some(Duration::from_millis(50))
        );
        assert!(!config.monitor.monitoring_enabled);
        assert_eq!(config.identifier_quote, Some('"'));
        assert_eq!(
            config.without_slow_query_threshold().monitor.slow_query_threshold,
            None
        );
    }
}
