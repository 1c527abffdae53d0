//! Query and transaction instrumentation.
//!
//! - `metrics` feature: counters and histograms on the OpenTelemetry global meter `mooring`.
//!   Wiring an exporter is up to the application.
//! - `tracing` feature: span constructors used around statements and transaction boundaries.
//! - [`measure`]: always-on `log` record with the elapsed time of a helper call.

use crate::error::OrmError;
use std::time::Instant;

#[cfg(feature = "metrics")]
pub use otel::{MooringMetrics, METRICS};

#[cfg(feature = "metrics")]
mod otel {
    use once_cell::sync::Lazy;
    use opentelemetry::{
        global,
        metrics::{Counter, Histogram},
        KeyValue,
    };
    use std::time::Duration;

    pub static METRICS: Lazy<MooringMetrics> = Lazy::new(MooringMetrics::init);

    pub struct MooringMetrics {
        pub queries_total: Counter<u64>,
        pub query_errors_total: Counter<u64>,
        pub query_duration: Histogram<f64>,
        pub transactions_total: Counter<u64>,
    }

    impl MooringMetrics {
        pub fn init() -> Self {
            let meter = global::meter("mooring");

            let queries_total = meter
                .u64_counter("mooring_queries_total")
                .with_description("Total statements executed")
                .build();

            let query_errors_total = meter
                .u64_counter("mooring_query_errors_total")
                .with_description("Statements that returned an error")
                .build();

            let query_duration = meter
                .f64_histogram("mooring_query_duration_seconds")
                .with_description("Duration of statements")
                .build();

            let transactions_total = meter
                .u64_counter("mooring_transactions_total")
                .with_description("Closed transactions by outcome")
                .build();

            Self {
                queries_total,
                query_errors_total,
                query_duration,
                transactions_total,
            }
        }

        pub fn record_query_duration(&self, elapsed: Duration) {
            self.queries_total.add(1, &[]);
            self.query_duration.record(elapsed.as_secs_f64(), &[]);
        }

        pub fn record_query_error(&self) {
            self.query_errors_total.add(1, &[]);
        }

        pub fn record_transaction(&self, outcome: &'static str) {
            self.transactions_total
                .add(1, &[KeyValue::new("outcome", outcome)]);
        }
    }
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::Span;

    pub fn execute_query_span(sql: &str) -> Span {
        tracing::debug_span!("mooring.query", sql = %sql)
    }

    pub fn begin_transaction_span(depth: u32) -> Span {
        tracing::debug_span!("mooring.transaction.begin", depth)
    }

    pub fn commit_transaction_span(depth: u32) -> Span {
        tracing::debug_span!("mooring.transaction.commit", depth)
    }

    pub fn rollback_transaction_span(depth: u32) -> Span {
        tracing::debug_span!("mooring.transaction.rollback", depth)
    }

    pub fn operation_span(operation: &str, table: &str) -> Span {
        tracing::info_span!("mooring.operation", operation = %operation, table = %table)
    }
}

/// Run `f` and log how long it took.
///
/// Successful calls are logged at debug level, failures at warn level with the error.
/// The result of `f` is returned untouched.
pub fn measure<T, F>(operation: &str, table: &str, f: F) -> Result<T, OrmError>
where
    F: FnOnce() -> Result<T, OrmError>,
{
    #[cfg(feature = "tracing")]
    let _span = tracing_helpers::operation_span(operation, table).entered();

    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();

    match &result {
        Ok(_) => log::debug!("operation={operation} table={table} duration={elapsed:?}"),
        Err(e) => log::warn!("operation={operation} table={table} duration={elapsed:?} error={e}"),
    }

    result
}
