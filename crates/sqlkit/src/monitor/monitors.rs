use super::truncate_sql_bytes;
use super::types::{QueryContext, QueryMonitor, QueryResult, QueryType};
use crate::error::OrmError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMonitor;

impl QueryMonitor for NoopMonitor {
    fn on_query_complete(&self, _ctx: &QueryContext, _duration: Duration, _result: &QueryResult) {}
}

/// Writes query, slow and error events to stderr, one line each.
#[derive(Debug, Clone)]
pub struct LoggingMonitor {
    /// Statements faster than this are not logged.
    pub min_duration: Option<Duration>,
    /// SQL longer than this many bytes is cut and suffixed with `...`.
    pub max_sql_length: Option<usize>,
    /// Leading marker of every line.
    pub prefix: String,
}

impl Default for LoggingMonitor {
    fn default() -> Self {
        Self {
            min_duration: None,
            max_sql_length: Some(200),
            prefix: "[sqlkit]".to_string(),
        }
    }
}

impl LoggingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip statements faster than `duration`.
    pub fn min_duration(mut self, duration: Duration) -> Self {
        self.min_duration = Some(duration);
        self
    }

    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

impl QueryMonitor for LoggingMonitor {
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        if self.min_duration.is_some_and(|min| duration < min) {
            return;
        }
        let tag = ctx.tag.as_deref().unwrap_or("-");
        eprintln!(
            "{} {:?} {} in {:?} ({}): {}",
            self.prefix,
            ctx.query_type,
            tag,
            duration,
            result,
            self.truncate_sql(&ctx.sql)
        );
    }

    fn on_slow_query(&self, ctx: &QueryContext, duration: Duration, _result: &QueryResult) {
        eprintln!(
            "{} slow {:?} took {:?}: {}",
            self.prefix,
            ctx.query_type,
            duration,
            self.truncate_sql(&ctx.sql)
        );
    }

    fn on_error(&self, error: &OrmError) {
        eprintln!("{} aborted: {}", self.prefix, error);
    }
}

/// Fans every event out to a list of monitors, in insertion order.
#[derive(Default)]
pub struct CompositeMonitor {
    monitors: Vec<Arc<dyn QueryMonitor>>,
}

impl CompositeMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a monitor.
    #[allow(clippy::should_implement_trait)]
    pub fn add<M: QueryMonitor + 'static>(mut self, monitor: M) -> Self {
        self.monitors.push(Arc::new(monitor));
        self
    }

    /// Append a shared monitor.
    pub fn add_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitors.push(monitor);
        self
    }
}

impl QueryMonitor for CompositeMonitor {
    fn on_query_start(&self, ctx: &QueryContext) {
        for monitor in &self.monitors {
            monitor.on_query_start(ctx);
        }
    }

    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        for monitor in &self.monitors {
            monitor.on_query_complete(ctx, duration, result);
        }
    }

    fn on_slow_query(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        for monitor in &self.monitors {
            monitor.on_slow_query(ctx, duration, result);
        }
    }

    fn on_error(&self, error: &OrmError) {
        for monitor in &self.monitors {
            monitor.on_error(error);
        }
    }
}

/// An event delivered by [`ChannelMonitor`].
#[derive(Debug, Clone, PartialEq)]
pub enum DbEvent {
    /// A statement completed.
    Query {
        sql: String,
        query_type: QueryType,
        tag: Option<String>,
        duration: Duration,
        result: QueryResult,
    },
    /// A statement reached the slow threshold.
    Slow {
        sql: String,
        tag: Option<String>,
        duration: Duration,
    },
    /// An operation aborted before writing.
    Error { message: String },
}

/// Forwards every monitor callback as a [`DbEvent`] over an unbounded channel.
///
/// Events are dropped silently once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelMonitor {
    tx: mpsc::UnboundedSender<DbEvent>,
}

impl ChannelMonitor {
    /// Create a monitor and the receiving end of its event channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DbEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl QueryMonitor for ChannelMonitor {
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        let _ = self.tx.send(DbEvent::Query {
            sql: ctx.sql.clone(),
            query_type: ctx.query_type,
            tag: ctx.tag.clone(),
            duration,
            result: result.clone(),
        });
    }

    fn on_slow_query(&self, ctx: &QueryContext, duration: Duration, _result: &QueryResult) {
        let _ = self.tx.send(DbEvent::Slow {
            sql: ctx.sql.clone(),
            tag: ctx.tag.clone(),
            duration,
        });
    }

    fn on_error(&self, error: &OrmError) {
        let _ = self.tx.send(DbEvent::Error {
            message: error.to_string(),
        });
    }
}
