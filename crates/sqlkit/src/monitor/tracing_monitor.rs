use super::truncate_sql_bytes;
use super::types::{QueryContext, QueryMonitor, QueryResult};
use crate::error::OrmError;
use std::time::Duration;

/// A `tracing`-based monitor (target: `sqlkit.sql`).
///
/// Completed statements are emitted at DEBUG, slow statements at WARN and
/// generator errors at ERROR.
///
/// Enable via the crate feature: `sqlkit = { features = ["tracing"] }`.
#[derive(Debug, Clone)]
pub struct TracingMonitor {
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for TracingMonitor {
    fn default() -> Self {
        Self {
            max_sql_length: Some(200),
        }
    }
}

impl TracingMonitor {
    /// Create a new monitor with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

impl QueryMonitor for TracingMonitor {
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        let tag = ctx.tag.as_deref().unwrap_or("-");
        tracing::debug!(
            target: "sqlkit.sql",
            query_type = ?ctx.query_type,
            tag,
            elapsed_ms = duration.as_millis() as u64,
            result = %result,
            sql = %self.truncate_sql(&ctx.sql),
        );
    }

    fn on_slow_query(&self, ctx: &QueryContext, duration: Duration, _result: &QueryResult) {
        let tag = ctx.tag.as_deref().unwrap_or("-");
        tracing::warn!(
            target: "sqlkit.sql",
            query_type = ?ctx.query_type,
            tag,
            elapsed_ms = duration.as_millis() as u64,
            sql = %self.truncate_sql(&ctx.sql),
            "slow query"
        );
    }

    fn on_error(&self, error: &OrmError) {
        tracing::error!(target: "sqlkit.sql", error = %error, "operation aborted");
    }
}
