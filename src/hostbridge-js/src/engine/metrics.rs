/*!
This module contains the definitions and implementations of the metrics used by the engine module
*/

use tracing::{Level, instrument};

// Gauge, active engines
static METRIC_ACTIVE_ENGINES: &str = "active_js_engines";

// Counter, total engines created during lifetime of the process
static METRIC_TOTAL_ENGINES: &str = "js_engines_total";

// Histograms, event handler call durations in microseconds
static METRIC_EVENT_HANDLER_CALLS: &str = "event_handler_calls_total";
static METRIC_EVENT_HANDLER_CALLS_WITH_GC: &str = "event_handler_calls_with_gc_total";
static METRIC_EVENT_HANDLER_NAME: &str = "event_handler_name";

pub(crate) struct EngineMetricsGuard;

impl EngineMetricsGuard {
    #[instrument(skip_all, level=Level::DEBUG)]
    pub(crate) fn new() -> Self {
        metrics::gauge!(METRIC_ACTIVE_ENGINES).increment(1);
        metrics::counter!(METRIC_TOTAL_ENGINES).increment(1);
        Self
    }
}

impl Drop for EngineMetricsGuard {
    #[instrument(skip_all, level=Level::DEBUG)]
    fn drop(&mut self) {
        metrics::gauge!(METRIC_ACTIVE_ENGINES).decrement(1);
    }
}

pub(crate) struct EventHandlerMetricGuard<'a> {
    func_name: &'a str,
    gc: bool,
    start: std::time::Instant,
}

impl<'a> EventHandlerMetricGuard<'a> {
    #[instrument(skip_all, level=Level::DEBUG)]
    pub(crate) fn new(func_name: &'a str, gc: bool) -> Self {
        Self {
            func_name,
            gc,
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for EventHandlerMetricGuard<'_> {
    #[instrument(skip_all, level=Level::DEBUG)]
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_micros() as f64;
        let func_name = self.func_name.to_string();
        if self.gc {
            metrics::histogram!(METRIC_EVENT_HANDLER_CALLS_WITH_GC, METRIC_EVENT_HANDLER_NAME => func_name)
                .record(duration);
        } else {
            metrics::histogram!(METRIC_EVENT_HANDLER_CALLS, METRIC_EVENT_HANDLER_NAME => func_name)
                .record(duration);
        }
    }
}
