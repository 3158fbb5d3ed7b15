//! Query monitoring and the error-event side channel.
//!
//! This module provides:
//! - [`InstrumentedClient`], a decorator around any [`Executor`](crate::client::Executor)
//!   that times every statement and reports it to a [`QueryMonitor`]
//! - "query" events for every statement, "slow" events above a configurable threshold
//! - "error" events for failures raised by the statement generator itself
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlkit::monitor::{ChannelMonitor, DbEvent, MonitorConfig};
//! use std::time::Duration;
//!
//! let (monitor, mut events) = ChannelMonitor::channel();
//! let db = sqlkit::Db::new(client)
//!     .with_monitor_config(MonitorConfig::new().with_slow_query_threshold(Duration::from_millis(100)))
//!     .with_monitor(monitor);
//!
//! tokio::spawn(async move {
//!     while let Some(event) = events.recv().await {
//!         if let DbEvent::Slow { sql, duration, .. } = event {
//!             eprintln!("slow ({duration:?}): {sql}");
//!         }
//!     }
//! });
//! ```

mod config;
mod instrumented;
mod monitors;
mod types;

#[cfg(feature = "tracing")]
mod tracing_monitor;


pub use config::{DEFAULT_SLOW_QUERY_THRESHOLD, MonitorConfig};
pub use instrumented::InstrumentedClient;
pub use monitors::{ChannelMonitor, CompositeMonitor, DbEvent, LoggingMonitor, NoopMonitor};
pub use types::{QueryContext, QueryMonitor, QueryResult, QueryType};

#[cfg(feature = "tracing")]
pub use tracing_monitor::TracingMonitor;

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
