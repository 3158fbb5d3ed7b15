use super::config::MonitorConfig;
use super::monitors::NoopMonitor;
use super::types::{QueryContext, QueryMonitor, QueryResult};
use crate::client::{Executor, QueryOutput};
use crate::dialect::Dialect;
use crate::error::{OrmError, OrmResult};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// An executor decorator that times every statement and reports it to a monitor.
///
/// Built once around the base executor and used in its place; the wrapped
/// executor is never modified.
pub struct InstrumentedClient<C> {
    client: C,
    monitor: Arc<dyn QueryMonitor>,
    config: MonitorConfig,
}

impl<C: Executor> InstrumentedClient<C> {
    /// Wrap `client` with the default configuration and a [`NoopMonitor`].
    pub fn new(client: C) -> Self {
        Self {
            client,
            monitor: Arc::new(NoopMonitor),
            config: MonitorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the monitor receiving events.
    pub fn with_monitor<M: QueryMonitor + 'static>(mut self, monitor: M) -> Self {
        self.monitor = Arc::new(monitor);
        self
    }

    pub fn with_monitor_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn is_monitoring_enabled(&self) -> bool {
        self.config.monitoring_enabled
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Threshold and switches can be changed between statements.
    pub fn config_mut(&mut self) -> &mut MonitorConfig {
        &mut self.config
    }

    /// The wrapped executor.
    pub fn inner(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    /// Deliver an error event. Not gated by `monitoring_enabled`.
    pub fn report_error(&self, error: &OrmError) {
        self.monitor.on_error(error);
    }

    fn report_result(&self, ctx: &QueryContext, duration: std::time::Duration, result: &QueryResult) {
        if !self.config.monitoring_enabled {
            return;
        }

        self.monitor.on_query_complete(ctx, duration, result);

        if self.config.is_slow(duration) {
            self.monitor.on_slow_query(ctx, duration, result);
        }
    }

    async fn execute_inner(&self, sql: &str, tag: Option<&str>) -> OrmResult<QueryOutput> {
        let mut ctx = QueryContext::new(sql);
        if let Some(tag) = tag {
            ctx.tag = Some(tag.to_string());
        }

        if self.config.monitoring_enabled {
            self.monitor.on_query_start(&ctx);
        }

        let start = Instant::now();
        let result = self.client.execute(sql).await;
        let duration = start.elapsed();

        self.report_result(&ctx, duration, &QueryResult::from_output(&result));
        result
    }
}

impl<C: Executor> Executor for InstrumentedClient<C> {
    async fn execute(&self, sql: &str) -> OrmResult<QueryOutput> {
        self.execute_inner(sql, None).await
    }

    async fn execute_tagged(&self, tag: &str, sql: &str) -> OrmResult<QueryOutput> {
        self.execute_inner(sql, Some(tag)).await
    }

    fn dialect(&self) -> Dialect {
        self.client.dialect()
    }

    fn escape_value(&self, value: &Value) -> String {
        self.client.escape_value(value)
    }
}
