//! Observability module
//!
//! Logging, metrics, and structured event infrastructure for monitoring
//! running typing engines.

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{Event, EventBuffer, EventEmitter};
pub use logging::{LogFormat, init_logging};
pub use metrics::init_metrics;
