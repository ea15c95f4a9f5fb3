//! Metrics collection for `typewriter`.
//!
//! Prometheus-compatible counters and gauges for running engines. The
//! `metrics` macros are no-ops until [`init_metrics`] installs a recorder,
//! so library users that never call it pay nothing.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::TypewriterError;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without
/// an HTTP endpoint.
///
/// # Errors
///
/// Returns `TypewriterError::Io` if the recorder or HTTP listener
/// cannot be installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), TypewriterError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| TypewriterError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!("typewriter_ticks_total", "Ticks rendered, per display");
    describe_counter!(
        "typewriter_cycles_total",
        "Phrases fully typed and deleted, per display"
    );
    describe_counter!(
        "typewriter_render_errors_total",
        "Display target render failures, per display"
    );
    describe_gauge!("typewriter_engines_active", "Engines currently running");
}

/// Records one rendered tick.
pub fn record_tick(display: &str) {
    counter!("typewriter_ticks_total", "display" => display.to_owned()).increment(1);
}

/// Records one completed type-delete cycle.
pub fn record_cycle(display: &str) {
    counter!("typewriter_cycles_total", "display" => display.to_owned()).increment(1);
}

/// Records a failed render.
pub fn record_render_error(display: &str) {
    counter!("typewriter_render_errors_total", "display" => display.to_owned()).increment(1);
}

/// Marks an engine as running.
pub fn engine_started() {
    gauge!("typewriter_engines_active").increment(1.0);
}

/// Marks an engine as stopped.
pub fn engine_stopped() {
    gauge!("typewriter_engines_active").decrement(1.0);
}
